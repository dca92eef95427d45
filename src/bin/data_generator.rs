use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

const JOB_CATEGORIES: [&str; 10] = [
    "Web Development",
    "App Development",
    "Data Entry",
    "Digital Marketing",
    "Writing",
    "Graphic Design",
    "Customer Service",
    "Video Editing",
    "SEO",
    "Virtual Assistant",
];
const PLATFORMS: [&str; 6] = ["Upwork", "Freelancer", "Fiverr", "Guru", "Toptal", "PeoplePerHour"];
const EXPERIENCE_LEVELS: [&str; 3] = ["Beginner", "Intermediate", "Expert"];
const REGIONS: [&str; 7] = ["Australia", "USA", "Middle East", "Asia", "UK", "Europe", "Canada"];
const PAYMENT_METHODS: [&str; 4] = ["Crypto", "Bank Transfer", "PayPal", "Mobile Banking"];
const PROJECT_TYPES: [&str; 2] = ["Fixed-Price", "Hourly"];

const HEADER: &str = "Freelancer_ID,Job_Category,Platform,Experience_Level,Client_Region,Payment_Method,Job_Completed,Earnings_USD,Hourly_Rate,Job_Success_Rate,Client_Rating,Job_Duration_Days,Project_Type,Rehire_Rate,Marketing_Spend";

fn pick<'a, R: Rng>(rng: &mut R, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

/// Writes a synthetic freelancer earnings CSV with the fixed schema
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output CSV file
    #[arg(default_value = "data/freelancer_earnings.csv")]
    path: PathBuf,

    /// Number of records to generate
    #[arg(long, default_value_t = 1000)]
    rows: usize,
}

fn main() -> Result<()> {
    let Args { path, rows } = Args::parse();

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    let file = File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{HEADER}")?;

    let mut rng = rand::rng();
    for id in 1..=rows {
        let level = rng.random_range(0..EXPERIENCE_LEVELS.len());
        // Experience drives rate and volume so group comparisons show a trend
        let hourly_rate = rng.random_range(5.0..40.0) * (level as f64 + 1.0);
        let jobs_completed = rng.random_range(1..100) * (level as i64 + 1);
        let earnings = (hourly_rate * jobs_completed as f64 * rng.random_range(2.0..12.0)) as i64;

        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{:.2},{:.2},{:.2},{},{},{:.2},{}",
            id,
            pick(&mut rng, &JOB_CATEGORIES),
            pick(&mut rng, &PLATFORMS),
            EXPERIENCE_LEVELS[level],
            pick(&mut rng, &REGIONS),
            pick(&mut rng, &PAYMENT_METHODS),
            jobs_completed,
            earnings,
            hourly_rate,
            rng.random_range(50.0..100.0),
            rng.random_range(3.0..5.0),
            rng.random_range(1..90),
            pick(&mut rng, &PROJECT_TYPES),
            rng.random_range(0.0..80.0),
            rng.random_range(0..5000),
        )?;
    }
    writer.flush()?;

    println!("Sample CSV generated: {} ({rows} rows)", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults_and_overrides() {
        let args = Args::try_parse_from(["data_generator"]).unwrap();
        assert_eq!(args.path, PathBuf::from("data/freelancer_earnings.csv"));
        assert_eq!(args.rows, 1000);

        let args = Args::try_parse_from(["data_generator", "out.csv", "--rows", "50"]).unwrap();
        assert_eq!(args.path, PathBuf::from("out.csv"));
        assert_eq!(args.rows, 50);

        assert!(Args::try_parse_from(["data_generator", "--rows", "many"]).is_err());
    }
}
