use clap::Parser;
use triage::cli::{
    handle_completions, handle_config_init, rules, Cli, Commands, ConfigCommands, RulesCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => triage::cli::serve::run_serve(args).await,
        Commands::Rules(cmd) => {
            let output = match cmd {
                RulesCommands::List(args) => rules::handle_rules_list(&args),
                RulesCommands::Check(args) => rules::handle_rules_check(&args),
            };
            output.map(|text| println!("{}", text))
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
