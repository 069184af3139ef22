use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use multihop_paths::Role;
use multihop_paths::dataset::DatasetFilter;
use multihop_paths::evaluation::scorer::GroupKey;

#[derive(Parser, Debug)]
#[command(
    name = "multihop-paths",
    version,
    about = "Reasoning-path and EM/F1 analysis for multi-hop QA predictions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Filter(FilterArgs),
    Score(ScoreArgs),
    Paths(PathsArgs),
    MaskEffect(MaskEffectArgs),
    Framing(FramingArgs),
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    #[arg(long)]
    pub hop: Option<u64>,

    #[arg(long)]
    pub question_type: Option<String>,
}

impl SelectionArgs {
    pub fn filter(&self) -> DatasetFilter {
        DatasetFilter::new(self.hop, self.question_type.clone())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RoleArg {
    Multi,
    Sub,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Multi => Role::Multi,
            RoleArg::Sub => Role::Sub,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long, value_enum)]
    pub role: Option<RoleArg>,

    #[arg(long)]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long)]
    pub input: PathBuf,

    /// Breakdown dimension; repeatable. Defaults to model, qtype, role, hop
    /// and question_type.
    #[arg(long = "group-key")]
    pub group_keys: Vec<GroupKey>,

    #[arg(long, default_value_t = false)]
    pub multi_sub: bool,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PathsArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long)]
    pub buckets_output: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct MaskEffectArgs {
    #[arg(long)]
    pub original: PathBuf,

    #[arg(long)]
    pub masked: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FramingArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[arg(long)]
    pub samples: PathBuf,

    /// JSONL of `{"qid": ..., "response": ...}` rows.
    #[arg(long)]
    pub responses: PathBuf,

    #[arg(long, default_value = "replay")]
    pub model_name: String,

    #[arg(long)]
    pub output: PathBuf,
}
