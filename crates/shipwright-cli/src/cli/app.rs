use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use super::download::DownloadArg;
use super::publish::PublishArg;

#[derive(Clone, Debug, Parser)]
#[command(name = "shipwright", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Executor settings in TOML.
    #[arg(long, global = true, env = "SHIPWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Raise log verbosity; repeat for more.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "dl", name = "download", about = "Download an artifact and verify its checksum")]
    Download(DownloadArg),
    #[command(alias = "pub", name = "publish", about = "Upload artifacts to a release server")]
    Publish(PublishArg),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() { App::command().debug_assert(); }

    #[test]
    fn test_parse_download() {
        let app = App::try_parse_from([
            "shipwright",
            "-vv",
            "download",
            "https://example.com/a.zip",
            "out/a.zip",
            "--sha512",
            "abc=",
            "-H",
            "Accept: application/zip",
        ])
        .unwrap();

        assert_eq!(app.verbose, 2);
        match app.cmd {
            Commands::Download(arg) => {
                assert_eq!(arg.url, "https://example.com/a.zip");
                assert_eq!(arg.sha512.as_deref(), Some("abc="));
                assert_eq!(arg.header, vec![("Accept".to_string(), "application/zip".to_string())]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
