use anyhow::{Result, bail};
use clap::Parser;
use log::debug;
use std::path::PathBuf;

use ftbdl::catalog;
use ftbdl::download::download_pack;
use ftbdl::manifest;
use ftbdl::paths::resolve_target_dir;
use ftbdl::report::report;
use ftbdl::runtime::RealRuntime;

/// ftbdl - An alternative Minecraft FTB modpack downloader
///
/// Downloads the files of a known modpack into a target directory,
/// optionally together with the matching Forge installer.
///
/// Examples:
///   ftbdl --list-packs
///   ftbdl --id 5 --directory ./packs --include-forge
#[derive(Parser, Debug)]
#[command(author, version = env!("FTBDL_VERSION"), about)]
struct Cli {
    /// The modpack id
    #[arg(long, value_name = "ID")]
    id: Option<u32>,

    /// Display a list of the available modpacks and their ids
    #[arg(long = "list-packs", short = 'l')]
    list_packs: bool,

    /// The desired download location; if omitted this is the current working
    /// directory. Downloaded files are placed in their appropriate
    /// sub-directories.
    #[arg(long, short = 'd', value_name = "PATH")]
    directory: Option<PathBuf>,

    /// Also download the required forge installer; it is placed in the same
    /// dir as --directory
    #[arg(long = "include-forge", short = 'f')]
    include_forge: bool,

    /// Increase verbosity
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Catalog API URL (also via FTBDL_API_URL)
    #[arg(
        long = "api-url",
        env = "FTBDL_API_URL",
        value_name = "URL",
        default_value = "https://api.modpacks.ch"
    )]
    api_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if cli.list_packs {
        print!("{}", catalog::listing());
        return Ok(());
    }

    let Some(id) = cli.id else {
        bail!("no modpack id given; use --id, or --list-packs to see what is available");
    };
    if let Some(pack) = catalog::find(id) {
        debug!("pack {id} is {} in the catalog", pack.name);
    } else {
        debug!("pack {id} is not in the catalog, trying the API anyway");
    }

    let runtime = RealRuntime;
    let target_dir = resolve_target_dir(&runtime, cli.directory)?;
    debug!("target directory: {}", target_dir.display());

    let client = ftbdl::http::client()?;
    let manifest = manifest::fetch(&client, &cli.api_url, id).await?;

    report(&format!(
        "Starting download of: {} [{} mods]",
        manifest.name,
        manifest.mod_count()
    ));
    download_pack(&runtime, &client, &manifest, &target_dir, cli.include_forge).await?;
    report(&format!("Finished download of: {}", manifest.name));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_id_parsing() {
        let cli = Cli::try_parse_from(["ftbdl", "--id", "5"]).unwrap();
        assert_eq!(cli.id, Some(5));
        assert!(!cli.list_packs);
        assert!(!cli.include_forge);
        assert_eq!(cli.directory, None);
        assert_eq!(cli.api_url, "https://api.modpacks.ch");
    }

    #[test]
    fn test_cli_list_packs_parsing() {
        let cli = Cli::try_parse_from(["ftbdl", "-l"]).unwrap();
        assert!(cli.list_packs);
        assert_eq!(cli.id, None);
    }

    #[test]
    fn test_cli_directory_and_forge_parsing() {
        let cli =
            Cli::try_parse_from(["ftbdl", "--id", "5", "-d", "/tmp/packs", "-f", "-v"]).unwrap();
        assert_eq!(cli.directory, Some(PathBuf::from("/tmp/packs")));
        assert!(cli.include_forge);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_api_url_override() {
        let cli =
            Cli::try_parse_from(["ftbdl", "--id", "5", "--api-url", "http://127.0.0.1:9999"])
                .unwrap();
        assert_eq!(cli.api_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_cli_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["ftbdl", "--id", "interactions"]).is_err());
    }
}
