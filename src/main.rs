//! School admin binary entry point

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use school_admin::{
    admin_tui::{
        components::record_table::build_table,
        fetch::{CycleOrdering, FetchController},
        screens::{courses_page, enrollments_page, students_page},
        traits::Record,
        App, ListConfig, Screen,
    },
    api::{ApiClient, Collections},
    config::Config,
};

#[derive(Parser)]
#[command(name = "school-admin")]
#[command(about = "Manage students, courses and enrollments from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Run in CLI mode (print output and exit, no interactive TUI)
    #[arg(long, global = true)]
    pub cli: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every record of a collection
    List {
        #[arg(value_enum)]
        entity: Entity,
    },
    /// Courses of the student whose name matches
    CoursesOf {
        /// Student name (partial match)
        name: String,
    },
    /// Show one course by its code
    Course {
        /// Course code
        code: String,
    },
    /// Students enrolled in a course
    StudentsIn {
        /// Course code
        code: String,
    },
    /// Start the TUI on a collection screen
    Open {
        #[arg(value_enum)]
        entity: Entity,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Entity {
    Students,
    Courses,
    Enrollments,
}

impl From<Entity> for Screen {
    fn from(entity: Entity) -> Self {
        match entity {
            Entity::Students => Screen::Students,
            Entity::Courses => Screen::Courses,
            Entity::Enrollments => Screen::Enrollments,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "school_admin=info");
    }

    let config = Config::from_env()?;
    config.validate()?;
    init_logging(&config, cli.cli);

    info!("Starting school admin against {}", config.api_url);
    let collections = Collections::new(ApiClient::new(&config)?);

    // Handle CLI mode - print output and exit without TUI
    if cli.cli {
        let ok = match cli.command {
            Some(command) => handle_cli_command(command, &collections).await,
            None => {
                eprintln!("Error: CLI mode requires a command");
                false
            }
        };
        if !ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    let start_screen = match cli.command {
        None => Screen::Home,
        Some(Commands::Open { entity }) | Some(Commands::List { entity }) => entity.into(),
        Some(Commands::CoursesOf { .. })
        | Some(Commands::StudentsIn { .. })
        | Some(Commands::Course { .. }) => {
            eprintln!("Error: lookups only run in CLI mode (add --cli)");
            std::process::exit(1);
        }
    };

    // Setup terminal for TUI mode
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, collections);
    if start_screen != Screen::Home {
        app.navigate_to_screen(start_screen);
    }

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result {
        Ok(()) => {
            info!("School admin exited successfully");
        }
        Err(e) => {
            error!("School admin encountered an error: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// File logging always; stderr too in CLI mode, where it cannot garble the UI
fn init_logging(config: &Config, with_stderr: bool) {
    let directory = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ".".into());
    let file_name = config
        .log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "school_admin.log".into());
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    let stderr_layer = with_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}

/// Handle CLI mode commands; returns whether the command succeeded
async fn handle_cli_command(command: Commands, collections: &Collections) -> bool {
    match command {
        Commands::List { entity: Entity::Students } => {
            print_collection(students_page(&collections.students)).await
        }
        Commands::List { entity: Entity::Courses } => {
            print_collection(courses_page(&collections.courses)).await
        }
        Commands::List { entity: Entity::Enrollments } => {
            print_collection(enrollments_page(collections)).await
        }
        Commands::CoursesOf { name } => match collections.enrollments.courses_of(&name).await {
            Ok(roster) => {
                println!("Courses of {}:", roster.student);
                print_names(&roster.courses);
                true
            }
            Err(message) => {
                eprintln!("Error: {}", message);
                false
            }
        },
        Commands::Course { code } => match collections.courses.find_by_code(&code).await {
            Ok(course) => {
                println!("{} ({})", course.name, course.code);
                println!("  Hours: {}h", course.hours);
                true
            }
            Err(message) => {
                eprintln!("Error: {}", message);
                false
            }
        },
        Commands::StudentsIn { code } => match collections.enrollments.students_in(&code).await {
            Ok(roster) => {
                println!("Students in {}:", roster.course);
                print_names(&roster.students);
                true
            }
            Err(message) => {
                eprintln!("Error: {}", message);
                false
            }
        },
        Commands::Open { .. } => {
            eprintln!("Error: open starts the TUI; run it without --cli");
            false
        }
    }
}

/// One fetch cycle, printed as an aligned table
async fn print_collection<R: Record>(page: ListConfig<R>) -> bool {
    let mut fetch = FetchController::mount(page.fetch.clone(), CycleOrdering::Completion);
    fetch.settle().await;

    if let Some(message) = &fetch.state().error {
        eprintln!("Error: {}", message);
        return false;
    }

    let rows = fetch.data().unwrap_or(&[]);
    println!("{}", build_table(&page.columns, rows, None).to_text());
    println!();
    println!("Total: {} {}", rows.len(), page.title.to_lowercase());
    true
}

fn print_names(names: &[String]) {
    if names.is_empty() {
        println!("  (none)");
    }
    for name in names {
        println!("  - {}", name);
    }
}
