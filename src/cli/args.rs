//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Build ordered trees from the command line, lay them out and print them
#[derive(Parser, Debug)]
#[command(name = "treelink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Settings file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Skip the ancestor walk when linking nodes
    #[arg(long, global = true)]
    pub lenient: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute Reingold-Tilford coordinates and print `name x y` per node
    Layout {
        #[command(flatten)]
        input: TreeInput,

        #[command(flatten)]
        params: LayoutArgs,
    },

    /// Print the tree structure
    Show {
        #[command(flatten)]
        input: TreeInput,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Where the tree comes from. Exactly one source is required.
#[derive(Args, Debug, Clone, Default)]
#[group(required = true, multiple = false)]
pub struct TreeInput {
    /// Complete binary tree in heap order, comma separated (e.g. 1,2,3,4)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub heap: Vec<String>,

    /// Parent/child edge, repeatable; children keep the order given
    #[arg(short, long = "edge", value_name = "PARENT:CHILD")]
    pub edges: Vec<String>,
}

/// Overrides for the configured layout parameters.
#[derive(Args, Debug, Clone, Default)]
pub struct LayoutArgs {
    /// Horizontal distance between adjacent siblings
    #[arg(long)]
    pub sibling_separation: Option<f64>,

    /// Horizontal distance between neighbouring subtrees below the sibling level
    #[arg(long)]
    pub subtree_separation: Option<f64>,

    /// Vertical distance between levels
    #[arg(long)]
    pub level_separation: Option<f64>,

    /// Added to every x coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub x_offset: Option<f64>,

    /// Added to every y coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub y_offset: Option<f64>,
}
