use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "composer",
    version,
    about = "Compose segments from schema fields and save them to the segment endpoint"
)]
pub struct Cli {
    /// Segment endpoint, overrides SEGMENT_WEBHOOK_URL and the config file
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Tick rate, i.e. number of ticks per second
    #[arg(long, value_name = "FLOAT")]
    pub tick_rate: Option<f64>,

    /// Frame rate, i.e. number of frames per second
    #[arg(long, value_name = "FLOAT")]
    pub frame_rate: Option<f64>,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Run interactive TUI (default)
    Run,
    /// List the schema fields a segment can use
    Fields {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a segment without the TUI
    Submit {
        /// Segment name
        #[arg(long, short)]
        name: String,
        /// Schema field key, repeat for several (e.g. --field first_name --field city)
        #[arg(long = "field", short = 'f', value_name = "KEY", required = true)]
        fields: Vec<String>,
    },
}

impl Cli {
    pub fn selected(&self) -> Cmd {
        self.cmd.clone().unwrap_or(Cmd::Run)
    }
}
