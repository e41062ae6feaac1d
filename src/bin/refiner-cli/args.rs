use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use prompt_refiner::bridge::CaptureKind;
use prompt_refiner::session::OutputTab;

#[derive(Parser, Debug)]
#[command(
    name = "refiner",
    about = "Refine prompts through a local refinement service",
    version
)]
pub struct CliArgs {
    /// Path to the config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
    /// Overrides `[service] base_url` from the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the service catalog and the current selection
    Status,
    /// Select a refinement mode
    Mode { id: String },
    /// Select a persona
    Persona { id: String },
    /// Flip a refinement toggle on or off
    Toggle { id: String },
    /// Apply a preset (mode, persona and toggles together)
    Preset { id: String },
    /// Select the model used for every flow
    Model { id: String },
    /// Set the sampling temperature (clamped to 0.0-2.0)
    Temperature {
        #[arg(allow_negative_numbers = true)]
        value: f32,
    },
    /// Set free-form instructions sent with single and chain refines
    Instructions { text: String },
    /// Select the agent pipeline for agentic refines
    Pipeline { id: String },
    /// Run a single-pass refine, or a two-pass chain with --chain
    Refine(RefineArgs),
    /// Run the selected agent pipeline
    Agentic(AgenticArgs),
    /// List recent refinements
    History {
        /// Number of entries to request
        #[arg(long)]
        limit: Option<usize>,
        /// Print the original prompt of this row and queue it for the next refine
        #[arg(long)]
        recall: Option<usize>,
    },
    /// Queue text for the next refine session
    Handoff { text: String },
}

#[derive(Args, Debug)]
pub struct RefineArgs {
    /// Prompt text; falls back to queued handoff text
    pub prompt: Option<String>,
    /// Run the refine-then-audit chain
    #[arg(long)]
    pub chain: bool,
    /// Copy a result tab to the clipboard
    #[arg(long, value_enum)]
    pub copy: Option<TabArg>,
    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct AgenticArgs {
    pub prompt: Option<String>,
    /// Show every step's full output instead of a preview
    #[arg(long)]
    pub full: bool,
    /// Copy the final prompt to the clipboard
    #[arg(long)]
    pub copy: bool,
    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct PageArgs {
    /// Capture the prompt from this source instead of the argument
    #[arg(long, value_enum)]
    pub from: Option<SourceArg>,
    /// JSON page snapshot used for selection, field capture and replace
    #[arg(long)]
    pub page: Option<PathBuf>,
    /// Write the result into the page's active field
    #[arg(long)]
    pub replace: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SourceArg {
    Clipboard,
    Selection,
    Field,
}

impl From<SourceArg> for CaptureKind {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Clipboard => CaptureKind::Clipboard,
            SourceArg::Selection => CaptureKind::PageSelection,
            SourceArg::Field => CaptureKind::ActiveField,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum TabArg {
    Refined,
    Changelog,
    System,
}

impl From<TabArg> for OutputTab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Refined => OutputTab::Refined,
            TabArg::Changelog => OutputTab::Changelog,
            TabArg::System => OutputTab::System,
        }
    }
}
