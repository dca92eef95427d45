use rand::Rng;
use std::io::{BufWriter, Write};
use tempfile::NamedTempFile;

const HEADER: &str = "Freelancer_ID,Job_Category,Platform,Experience_Level,Client_Region,Payment_Method,Job_Completed,Earnings_USD,Hourly_Rate,Job_Success_Rate,Client_Rating,Job_Duration_Days,Project_Type,Rehire_Rate,Marketing_Spend";

/// Writes `rows` random freelancer records to a temporary CSV. The file is
/// removed when the returned handle is dropped.
pub fn sample_dataset(rows: usize) -> std::io::Result<NamedTempFile> {
    let tmp = NamedTempFile::new()?;
    let mut writer = BufWriter::new(tmp.reopen()?);
    writeln!(writer, "{HEADER}")?;

    let mut rng = rand::rng();
    for id in 1..=rows {
        let payment = ["Crypto", "Bank Transfer", "PayPal", "Mobile Banking"][rng.random_range(0..4)];
        // crypto earners skew higher so the comparison has something to show
        let base: i64 = if payment == "Crypto" { 3000 } else { 1500 };
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{:.2},{:.2},{:.2},{},{},{:.2},{}",
            id,
            ["Web Development", "Writing", "SEO", "Data Entry"][rng.random_range(0..4)],
            ["Upwork", "Fiverr", "Toptal"][rng.random_range(0..3)],
            ["Beginner", "Intermediate", "Expert"][rng.random_range(0..3)],
            ["USA", "Asia", "Europe", "UK", "Canada"][rng.random_range(0..5)],
            payment,
            rng.random_range(1..300),
            base + rng.random_range(0..5000),
            rng.random_range(5.0..120.0),
            rng.random_range(50.0..100.0),
            rng.random_range(3.0..5.0),
            rng.random_range(1..90),
            ["Fixed-Price", "Hourly"][rng.random_range(0..2)],
            rng.random_range(0.0..80.0),
            rng.random_range(0..5000),
        )?;
    }
    writer.flush()?;
    Ok(tmp)
}
