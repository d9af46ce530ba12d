use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use dotenvy::dotenv;
use edudesk_cli::seeder::{self, SeedConfig};
use edudesk_config::DatabaseConfig;
use edudesk_db::{init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "edudesk-cli")]
#[command(about = "edudesk CLI - Demo data tools for edudesk", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed classes, sections, subjects, teachers, buses, periods, students,
    /// a draft timetable and term fees
    Seed {
        /// Number of classes (grades)
        #[arg(short = 'c', long, default_value = "6")]
        classes: usize,

        /// Number of sections per class
        #[arg(long, default_value = "2")]
        sections: usize,

        /// Number of students per section
        #[arg(long, default_value = "20")]
        students: usize,

        /// Number of teachers
        #[arg(long, default_value = "15")]
        teachers: usize,

        /// Number of buses
        #[arg(long, default_value = "4")]
        buses: usize,

        /// Number of periods per day
        #[arg(long, default_value = "6")]
        periods: usize,

        /// Skip the draft timetable
        #[arg(long)]
        no_schedules: bool,

        /// Skip term fees
        #[arg(long)]
        no_fees: bool,
    },
    /// Clear all seeded data
    ClearSeed {
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let cli = Cli::parse();

    let database = DatabaseConfig::from_env()?;
    let pool = init_db_pool(&database).await?;
    if database.run_migrations {
        run_migrations(&pool).await?;
    }

    match cli.command {
        Commands::Seed {
            classes,
            sections,
            students,
            teachers,
            buses,
            periods,
            no_schedules,
            no_fees,
        } => {
            let mut config = SeedConfig::default()
                .with_classes(classes, sections)
                .with_students_per_section(students)
                .with_teachers(teachers)
                .with_buses(buses)
                .with_periods(periods);
            if no_schedules {
                config = config.without_schedules();
            }
            if no_fees {
                config = config.without_fees();
            }

            if let Err(e) = seeder::seed_all(&pool, config).await {
                eprintln!("\n❌ Error seeding database: {}", e);
                std::process::exit(1);
            }
        }
        Commands::ClearSeed { yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt("Delete all seeded students, staff, classes, buses and fees?")
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("Aborted");
                return Ok(());
            }

            if let Err(e) = seeder::clear_all(&pool).await {
                eprintln!("\n❌ Error clearing seeded data: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
