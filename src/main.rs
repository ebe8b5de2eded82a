use clap::Parser;
use color_eyre::Result;
use hintro::{
    BoardStore, Config, Profile, SyncChannel,
    cli::{Cli, Commands},
};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // Load configuration with the determined profile
    // Note: --config option is parsed but not yet used to override config path
    let config = Config::load_with_profile(profile)?;

    // Open the board store on the configured database
    let db_path = config.get_database_path();
    let store = BoardStore::open(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
        SyncChannel::new(),
    )?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Login { email } => {
            hintro::cli::handle_login(email, &store)?;
        }
        Commands::Signup { name, email } => {
            hintro::cli::handle_signup(name, email, &store)?;
        }
        Commands::Logout => {
            hintro::cli::handle_logout(&store)?;
        }
        Commands::Whoami => {
            hintro::cli::handle_whoami(&store)?;
        }
        Commands::Users { json } => {
            hintro::cli::handle_users(json, &store)?;
        }
        Commands::Boards { json } => {
            hintro::cli::handle_boards(json, &store)?;
        }
        Commands::CreateBoard { title } => {
            hintro::cli::handle_create_board(title, &store)?;
        }
        Commands::Lists { board, json } => {
            hintro::cli::handle_lists(board, json, &store)?;
        }
        Commands::Tasks { board, json } => {
            hintro::cli::handle_tasks(board, json, &store)?;
        }
        Commands::AddTask {
            title,
            list,
            board,
            priority,
            assignee,
            description,
        } => {
            hintro::cli::handle_add_task(title, list, board, priority, assignee, description, &store)?;
        }
        Commands::EditTask {
            id,
            title,
            description,
            priority,
            assignee,
            unassign,
            list,
        } => {
            hintro::cli::handle_edit_task(
                id,
                title,
                description,
                priority,
                assignee,
                unassign,
                list,
                &store,
            )?;
        }
        Commands::DelTask { id } => {
            hintro::cli::handle_del_task(id, &store)?;
        }
        Commands::MoveTask { id, list, position } => {
            hintro::cli::handle_move_task(id, list, position, &store)?;
        }
        Commands::Activity {
            page,
            page_size,
            json,
        } => {
            let page_size = page_size.unwrap_or(config.activity_page_size);
            hintro::cli::handle_activity(page.unwrap_or(1), page_size, json, &store)?;
        }
    }

    Ok(())
}
