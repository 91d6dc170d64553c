//! Command dispatch: load settings, build the tree, run the requested operation.

use std::collections::HashMap;
use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::cli::args::{Cli, Commands, LayoutArgs, TreeInput};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::domain::{AttrValue, BinaryTree, ChildSlots, Forest, NodeId, Tree};
use crate::layout::{reingold_tilford, LayoutParams, ATTR_X, ATTR_Y};
use crate::tree_traits::TreeNodeConvert;

/// A tree parsed from the command line, with its root.
#[derive(Debug)]
pub enum LoadedTree {
    Nary(Tree, NodeId),
    Binary(BinaryTree, NodeId),
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Layout { input, params }) => _layout(cli, input, params),
        Some(Commands::Show { input }) => _show(cli, input),
        Some(Commands::Completion { shell }) => _completion(*shell),
        None => Ok(()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.lenient {
        settings.strict = false;
    }
    Ok(settings)
}

/// Build the tree described by `input` in a forest configured by `settings`.
#[instrument(level = "debug", skip(settings))]
pub fn load_tree(input: &TreeInput, settings: &Settings) -> CliResult<LoadedTree> {
    if !input.heap.is_empty() {
        let mut tree: BinaryTree = settings.forest();
        let root = tree
            .from_heap_list(&input.heap)?
            .ok_or_else(|| CliError::InvalidArgs("empty heap list".into()))?;
        return Ok(LoadedTree::Binary(tree, root));
    }

    let mut tree: Tree = settings.forest();
    let mut ids: HashMap<String, NodeId> = HashMap::new();
    for edge in &input.edges {
        let (parent, child) = edge
            .split_once(':')
            .map(|(p, c)| (p.trim(), c.trim()))
            .filter(|(p, c)| !p.is_empty() && !c.is_empty())
            .ok_or_else(|| {
                CliError::InvalidArgs(format!("edge '{}' is not PARENT:CHILD", edge))
            })?;
        let parent = *ids
            .entry(parent.to_string())
            .or_insert_with(|| tree.insert(parent));
        let child = *ids
            .entry(child.to_string())
            .or_insert_with(|| tree.insert(child));
        tree.append(parent, child)?;
    }

    let roots = tree.roots().collect_vec();
    match roots.as_slice() {
        [root] => Ok(LoadedTree::Nary(tree, *root)),
        _ => Err(CliError::InvalidArgs(format!(
            "edges must form a single tree, found {} roots",
            roots.len()
        ))),
    }
}

/// Apply command line overrides on top of the configured parameters.
fn layout_params(settings: &mut Settings, args: &LayoutArgs) -> CliResult<LayoutParams> {
    let layout = &mut settings.layout;
    let overrides = [
        (&mut layout.sibling_separation, args.sibling_separation),
        (&mut layout.subtree_separation, args.subtree_separation),
        (&mut layout.level_separation, args.level_separation),
        (&mut layout.x_offset, args.x_offset),
        (&mut layout.y_offset, args.y_offset),
    ];
    for (slot, value) in overrides {
        if let Some(value) = value {
            *slot = value;
        }
    }
    settings.validate()?;
    Ok(settings.layout)
}

#[instrument(level = "debug", skip(cli))]
fn _layout(cli: &Cli, input: &TreeInput, args: &LayoutArgs) -> CliResult<()> {
    let mut settings = load_settings(cli)?;
    let params = layout_params(&mut settings, args)?;
    debug!(?params, "layout parameters");
    match load_tree(input, &settings)? {
        LoadedTree::Nary(mut tree, root) => print_layout(&mut tree, root, &params),
        LoadedTree::Binary(mut tree, root) => print_layout(&mut tree, root, &params),
    }
}

fn print_layout<S: ChildSlots>(
    forest: &mut Forest<S>,
    root: NodeId,
    params: &LayoutParams,
) -> CliResult<()> {
    let bounds = reingold_tilford(forest, root, params)?;
    for id in forest.preorder(root) {
        let coordinate = |key: &str| forest.get_attr(id, key).and_then(AttrValue::as_f64);
        let (x, y) = (coordinate(ATTR_X), coordinate(ATTR_Y));
        output::coordinate(
            forest.name(id).unwrap_or_default(),
            x.unwrap_or_default(),
            y.unwrap_or_default(),
        );
    }
    info!(
        width = bounds.width(),
        height = bounds.height(),
        "layout bounds"
    );
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn _show(cli: &Cli, input: &TreeInput) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let (rendered, nodes) = match load_tree(input, &settings)? {
        LoadedTree::Nary(tree, root) => (tree.to_tree_string(root), tree.len()),
        LoadedTree::Binary(tree, root) => (tree.to_tree_string(root), tree.len()),
    };
    output::header(&format!("{} nodes", nodes));
    output::info(&rendered);
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
