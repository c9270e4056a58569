use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vita_core::*;

#[derive(Parser)]
#[command(name = "vita")]
#[command(about = "Local health tracker: weight, calories, water and sleep", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up your profile (computes your daily calorie target)
    Init {
        /// Current weight in kg
        #[arg(long)]
        weight: f32,

        /// Target weight in kg
        #[arg(long)]
        target_weight: f32,

        /// Height in cm
        #[arg(long)]
        height: i32,

        /// Age in years
        #[arg(long)]
        age: i32,

        /// Gender (male or female)
        #[arg(long)]
        gender: Gender,

        /// Activity multiplier (overrides config; 1.2 = minimal activity)
        #[arg(long)]
        activity: Option<f32>,
    },

    /// Record and browse weight measurements
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },

    /// Log food and calories
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },

    /// Log water intake
    Water {
        #[command(subcommand)]
        command: WaterCommands,
    },

    /// Log sleep
    Sleep {
        #[command(subcommand)]
        command: SleepCommands,
    },

    /// Show the daily summary (default command)
    Today {
        /// Day to summarize (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show statistics and trends
    Stats {
        /// Trailing period in days (7, 30, 90 or "all")
        #[arg(long, default_value = "all")]
        period: String,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Record a weight measurement
    Add { kg: f32 },
    /// List measurements, newest first
    List {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Delete a measurement by id
    Rm { id: i64 },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Log a food item
    Add {
        name: String,
        kcal: i32,
        /// Protein in grams
        #[arg(long, default_value_t = 0.0)]
        protein: f32,
        /// Fat in grams
        #[arg(long, default_value_t = 0.0)]
        fat: f32,
        /// Carbohydrates in grams
        #[arg(long, default_value_t = 0.0)]
        carb: f32,
    },
    /// List entries for a day (default today)
    List {
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete an entry by id
    Rm { id: i64 },
}

#[derive(Subcommand)]
enum WaterCommands {
    /// Log water intake in millilitres
    Add { ml: i32 },
    /// List entries for a day (default today)
    List {
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete an entry by id
    Rm { id: i64 },
}

#[derive(Subcommand)]
enum SleepCommands {
    /// Log a night of sleep
    Add {
        hours: f32,
        /// Quality rating 1-5
        #[arg(value_parser = clap::value_parser!(i32).range(1..=5))]
        quality: i32,
    },
    /// List sleep entries, newest first
    List,
    /// Delete an entry by id
    Rm { id: i64 },
}

fn main() -> Result<()> {
    vita_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = Store::global(&data_dir.join("vita.db"))?.clone();
    let tracker = Tracker::new(store, config.profile.activity_level);

    match cli.command {
        Some(Commands::Init {
            weight,
            target_weight,
            height,
            age,
            gender,
            activity,
        }) => {
            let tracker = match activity {
                Some(level) => Tracker::new(tracker.store().clone(), level),
                None => tracker,
            };
            cmd_init(&tracker, weight, target_weight, height, age, gender)
        }
        Some(Commands::Weight { command }) => cmd_weight(&tracker, command),
        Some(Commands::Food { command }) => cmd_food(&tracker, command),
        Some(Commands::Water { command }) => cmd_water(&tracker, command, &config),
        Some(Commands::Sleep { command }) => cmd_sleep(&tracker, command),
        Some(Commands::Today { date }) => cmd_today(&tracker, date, &config),
        Some(Commands::Stats { period, json }) => cmd_stats(&tracker, &period, json),
        None => cmd_today(&tracker, None, &config),
    }
}

fn cmd_init(
    tracker: &Tracker,
    weight: f32,
    target_weight: f32,
    height: i32,
    age: i32,
    gender: Gender,
) -> Result<()> {
    if tracker.is_onboarded()? {
        println!("A profile already exists - replacing it.");
    }

    let profile =
        tracker.complete_onboarding(weight, target_weight, height, age, gender, Utc::now())?;

    println!("✓ Profile saved");
    println!("  Current weight: {} kg", profile.current_weight);
    println!("  Target weight:  {} kg", profile.target_weight);
    println!("  Daily calories: {} kcal", profile.daily_calorie_limit);
    Ok(())
}

fn cmd_weight(tracker: &Tracker, command: WeightCommands) -> Result<()> {
    match command {
        WeightCommands::Add { kg } => {
            let entry = tracker.add_weight(kg, Utc::now())?;
            println!("✓ Logged {} kg on {} (id {})", entry.weight, entry.date, entry.id);
        }
        WeightCommands::List { limit } => {
            let entries = tracker.store().recent_weight_entries(limit)?;
            if entries.is_empty() {
                println!("No weight entries yet.");
                return Ok(());
            }
            for entry in entries {
                println!("  {:>4}  {}  {:.1} kg", entry.id, entry.date, entry.weight);
            }
        }
        WeightCommands::Rm { id } => {
            if tracker.delete_weight(id)? {
                println!("✓ Removed weight entry {}", id);
            } else {
                println!("No weight entry with id {}", id);
            }
        }
    }
    Ok(())
}

fn cmd_food(tracker: &Tracker, command: FoodCommands) -> Result<()> {
    match command {
        FoodCommands::Add {
            name,
            kcal,
            protein,
            fat,
            carb,
        } => {
            let entry = tracker.add_food(&name, kcal, protein, fat, carb, Utc::now())?;
            println!(
                "✓ Logged {} ({} kcal) on {} (id {})",
                entry.food_name, entry.calories, entry.date, entry.id
            );
        }
        FoodCommands::List { date } => {
            let date = date.unwrap_or_else(|| day_string(Utc::now()));
            let entries = tracker.store().calorie_entries_by_date(&date)?;
            if entries.is_empty() {
                println!("Nothing logged on {}.", date);
                return Ok(());
            }
            let mut total = 0;
            for entry in &entries {
                total += entry.calories;
                println!(
                    "  {:>4}  {:<20} {:>5} kcal  (P {:.0}g / F {:.0}g / C {:.0}g)",
                    entry.id, entry.food_name, entry.calories, entry.proteins, entry.fats,
                    entry.carbs
                );
            }
            println!("  Total: {} kcal", total);
        }
        FoodCommands::Rm { id } => {
            if tracker.delete_food(id)? {
                println!("✓ Removed food entry {}", id);
            } else {
                println!("No food entry with id {}", id);
            }
        }
    }
    Ok(())
}

fn cmd_water(tracker: &Tracker, command: WaterCommands, config: &Config) -> Result<()> {
    match command {
        WaterCommands::Add { ml } => {
            let entry = tracker.add_water(ml, Utc::now())?;
            let total = tracker
                .store()
                .total_water_by_date(&entry.date)?
                .unwrap_or(0);
            println!(
                "✓ Logged {} ml (today: {} / {} ml)",
                entry.milliliters, total, config.goals.daily_water_ml
            );
        }
        WaterCommands::List { date } => {
            let date = date.unwrap_or_else(|| day_string(Utc::now()));
            let entries = tracker.store().water_entries_by_date(&date)?;
            if entries.is_empty() {
                println!("No water logged on {}.", date);
                return Ok(());
            }
            for entry in &entries {
                println!("  {:>4}  {} ml", entry.id, entry.milliliters);
            }
        }
        WaterCommands::Rm { id } => {
            if tracker.delete_water(id)? {
                println!("✓ Removed water entry {}", id);
            } else {
                println!("No water entry with id {}", id);
            }
        }
    }
    Ok(())
}

fn cmd_sleep(tracker: &Tracker, command: SleepCommands) -> Result<()> {
    match command {
        SleepCommands::Add { hours, quality } => {
            let entry = tracker.add_sleep(hours, quality, Utc::now())?;
            println!(
                "✓ Logged {:.1}h sleep, quality {}/5 on {}",
                entry.hours, entry.quality, entry.date
            );
        }
        SleepCommands::List => {
            let entries = tracker.store().sleep_entries()?;
            if entries.is_empty() {
                println!("No sleep entries yet.");
                return Ok(());
            }
            for entry in &entries {
                println!(
                    "  {:>4}  {}  {:.1}h  quality {}/5",
                    entry.id, entry.date, entry.hours, entry.quality
                );
            }
        }
        SleepCommands::Rm { id } => {
            if tracker.delete_sleep(id)? {
                println!("✓ Removed sleep entry {}", id);
            } else {
                println!("No sleep entry with id {}", id);
            }
        }
    }
    Ok(())
}

fn cmd_today(tracker: &Tracker, date: Option<String>, config: &Config) -> Result<()> {
    let date = date.unwrap_or_else(|| day_string(Utc::now()));
    let summary = tracker.daily_summary(&date)?;

    println!("Summary for {}", summary.date);
    println!("─────────────────────────────");

    match summary.calorie_limit {
        Some(limit) => println!("  Calories: {} / {} kcal", summary.total_calories, limit),
        None => println!("  Calories: {} kcal (run `vita init` to set a target)", summary.total_calories),
    }

    println!(
        "  Water:    {} / {} ml",
        summary.total_water_ml, config.goals.daily_water_ml
    );

    match &summary.sleep {
        Some(sleep) => println!("  Sleep:    {:.1}h, quality {}/5", sleep.hours, sleep.quality),
        None => println!("  Sleep:    not logged"),
    }

    match &summary.latest_weight {
        Some(weight) => println!("  Weight:   {:.1} kg (last on {})", weight.weight, weight.date),
        None => println!("  Weight:   not logged"),
    }

    Ok(())
}

fn cmd_stats(tracker: &Tracker, period: &str, json: bool) -> Result<()> {
    let period_days = parse_period(period);
    let stats = tracker.stats(period_days, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    match stats.period_days {
        Some(days) => println!("Statistics (last {} days)", days),
        None => println!("Statistics (all time)"),
    }
    println!("─────────────────────────────");
    println!("  Average weight:  {:.1} kg", stats.average_weight);
    println!("  Weekly change:   {:+.1} kg", stats.weekly_change);
    println!("  Trend:           {}", stats.trend);
    println!("  Avg calories:    {} kcal/day", stats.average_daily_calories);
    println!("  Days over limit: {}", stats.days_over_limit);

    match stats.estimated_days_to_goal {
        Some(days) => println!("  Goal estimate:   ~{} days", days),
        None => println!("  Goal estimate:   no estimate"),
    }

    if !stats.daily_calorie_totals.is_empty() {
        println!();
        println!("  Daily calories:");
        for (date, total) in &stats.daily_calorie_totals {
            println!("    {}  {:>5} kcal", date, total);
        }
    }

    Ok(())
}

/// Parse a period flag: a day count, or "all" for no filtering
fn parse_period(period: &str) -> Option<u32> {
    match period.to_lowercase().as_str() {
        "all" => None,
        value => match value.parse::<u32>() {
            Ok(days) => Some(days),
            Err(_) => {
                eprintln!("Unknown period: {}. Using all time.", period);
                None
            }
        },
    }
}
