//! Command line definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use waypost_core::{EdgeId, NodeId};
use waypost_workflow::NodeKind;

#[derive(Parser, Debug)]
#[command(name = "waypost")]
#[command(version)]
#[command(about = "Annotate workflow steps and get reminded of them on schedule")]
#[command(long_about = r#"
waypost keeps a small workflow graph of note and action nodes. Notes carry
text, file names and links; action nodes schedule a notification that
summarizes every note feeding them.

EXAMPLES:
  waypost node add note --id prep --label "Prepare"
  waypost node add action --id remind
  waypost connect prep remind
  waypost note prep "Book the room, see https://example.com/rooms"
  waypost schedule remind --date 2026-10-19 --time 09:00

ENVIRONMENT VARIABLES:
  WAYPOST_DATA_DIR    Workflow directory (default: .waypost)
  WAYPOST__*          Configuration overrides, e.g. WAYPOST__NOTIFICATION__PERMISSION
  RUST_LOG            Log filter (default: info)
"#)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Directory holding the workflow files
    #[arg(short, long, env = "WAYPOST_DATA_DIR", global = true)]
    #[arg(default_value = ".waypost")]
    pub data_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add, remove or list nodes
    #[command(subcommand)]
    Node(NodeCommand),

    /// Connect SOURCE to TARGET
    Connect { source: NodeId, target: NodeId },

    /// Remove an edge
    Disconnect { edge_id: EdgeId },

    /// Prevent new nodes from being placed
    Lock,

    /// Allow new nodes to be placed again
    Unlock,

    /// Replace the notes of a node
    Note { node_id: NodeId, text: String },

    /// Attach file names to a node
    Attach {
        node_id: NodeId,
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Add a link to a node
    Link { node_id: NodeId, url: String },

    /// Show a node and its annotations
    Show { node_id: NodeId },

    /// List the chain of nodes feeding a node
    Chain { node_id: NodeId },

    /// Print the summary an action node would deliver
    Summary { node_id: NodeId },

    /// Schedule the notification of an action node
    Schedule(ScheduleArgs),

    /// Show the schedule of every action node
    Status,

    /// Arm pending schedules and wait for them to fire
    Run,
}

#[derive(Subcommand, Debug)]
pub enum NodeCommand {
    /// Place a new node
    Add {
        /// `note` or `action`
        kind: NodeKind,

        /// Explicit id (generated when omitted)
        #[arg(long)]
        id: Option<NodeId>,

        #[arg(long)]
        label: Option<String>,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f64,
    },

    /// Remove a node and its edges
    Remove { node_id: NodeId },

    /// List nodes
    List,
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    pub node_id: NodeId,

    /// Local date, YYYY-MM-DD
    #[arg(long)]
    pub date: String,

    /// Local time, HH:MM
    #[arg(long)]
    pub time: String,

    /// Record the time without waiting for it; `waypost run` arms it later
    #[arg(long)]
    pub detach: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_node_add_with_options() {
        let cli = Cli::try_parse_from([
            "waypost", "--data-dir", "/tmp/wf", "node", "add", "action", "--id", "remind", "--x", "-4.5",
        ])
        .unwrap();

        assert_eq!(cli.global.data_dir, PathBuf::from("/tmp/wf"));
        match cli.command {
            Command::Node(NodeCommand::Add { kind, id, x, .. }) => {
                assert_eq!(kind, NodeKind::Action);
                assert_eq!(id, Some(NodeId::new("remind")));
                assert_eq!(x, -4.5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn schedule_requires_date_and_time() {
        assert!(Cli::try_parse_from(["waypost", "schedule", "remind", "--date", "2026-10-19"]).is_err());

        let cli = Cli::try_parse_from([
            "waypost", "schedule", "remind", "--date", "2026-10-19", "--time", "09:00", "--detach",
        ])
        .unwrap();
        match cli.command {
            Command::Schedule(args) => {
                assert_eq!(args.node_id, NodeId::new("remind"));
                assert!(args.detach);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn attach_needs_at_least_one_file() {
        assert!(Cli::try_parse_from(["waypost", "attach", "prep"]).is_err());
    }

    #[test]
    fn blank_node_id_is_rejected() {
        assert!(Cli::try_parse_from(["waypost", "show", " "]).is_err());
    }
}
