use clap::{Parser, Subcommand};
use hiit_cli::CliContext;
use hiit_cli::commands::{self, SettingsArgs};
use hiit_cli::logging;

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let _log_guard = logging::init();
    let mut ctx = CliContext::new();

    match &cli.command {
        Commands::Run(args) => commands::run(args, &mut ctx).await,
        Commands::Plan(args) => commands::show_plan(args, &ctx),
        Commands::Presets { action } => match action {
            PresetAction::List => {
                commands::list_presets(&ctx);
                Ok(())
            }
            PresetAction::Save { name, settings } => {
                commands::save_preset(name, settings, &mut ctx)
            }
            PresetAction::Delete { name } => commands::delete_preset(name, &mut ctx),
        },
    }
}

#[derive(Parser)]
#[command(name = "hiit", version, about = "Interval workout timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workout in the terminal
    Run(SettingsArgs),
    /// Print the phases a workout would run, without running it
    Plan(SettingsArgs),
    /// Manage saved presets
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand)]
enum PresetAction {
    List,
    /// Save settings under a name, replacing any preset with that name
    Save {
        name: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    Delete {
        name: String,
    },
}
