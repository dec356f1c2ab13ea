use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::print_batches;
use chrono::{Days, NaiveDate};
use parquet::arrow::ArrowWriter;
use sales_lens::data::model::{
    CATEGORY, CITY, ORDER_DATE, PROFIT, QUANTITY, REGION, SALES, SEGMENT, STATE, SUB_CATEGORY,
};

const ROWS: usize = 2_000;
const DAYS: u64 = 730;

/// Region → (state, cities).
const GEOGRAPHY: [(&str, &[(&str, &[&str])]); 4] = [
    ("Central", &[("Texas", &["Houston", "Dallas"]), ("Illinois", &["Chicago"])]),
    ("East", &[("New York", &["New York City", "Rochester"]), ("Pennsylvania", &["Philadelphia"])]),
    ("South", &[("Florida", &["Jacksonville", "Miami"]), ("Kentucky", &["Henderson"])]),
    ("West", &[("California", &["Los Angeles", "San Francisco"]), ("Washington", &["Seattle"])]),
];

/// Category → (sub-category, typical unit price).
const CATALOGUE: [(&str, &[(&str, f64)]); 3] = [
    ("Furniture", &[("Bookcases", 180.0), ("Chairs", 130.0), ("Tables", 260.0), ("Furnishings", 35.0)]),
    ("Office Supplies", &[("Binders", 20.0), ("Paper", 12.0), ("Labels", 6.0), ("Storage", 75.0)]),
    ("Technology", &[("Phones", 120.0), ("Accessories", 55.0), ("Machines", 400.0), ("Copiers", 700.0)]),
];

const SEGMENTS: [&str; 3] = ["Consumer", "Corporate", "Home Office"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

#[derive(Default)]
struct Columns {
    row_id: Vec<i64>,
    order_date: Vec<NaiveDate>,
    region: Vec<&'static str>,
    state: Vec<&'static str>,
    city: Vec<&'static str>,
    category: Vec<&'static str>,
    sub_category: Vec<&'static str>,
    segment: Vec<&'static str>,
    sales: Vec<f64>,
    profit: Vec<f64>,
    quantity: Vec<i64>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn generate(rng: &mut SimpleRng, start: NaiveDate) -> Columns {
    let mut cols = Columns::default();
    for i in 0..ROWS {
        let (region, states) = rng.pick(&GEOGRAPHY);
        let (state, cities) = rng.pick(*states);
        let city = rng.pick(*cities);
        let (category, subs) = rng.pick(&CATALOGUE);
        let (sub_category, unit_price) = rng.pick(*subs);

        let quantity = 1 + rng.below(9) as i64;
        let discount = [0.0, 0.0, 0.1, 0.2, 0.3][rng.below(5)];
        let price = unit_price * (0.6 + rng.next_f64() * 0.8);
        let sales = round2(price * quantity as f64 * (1.0 - discount));
        let margin = 0.25 - discount * 1.2 + (rng.next_f64() - 0.5) * 0.1;

        cols.row_id.push(i as i64 + 1);
        cols.order_date.push(start + Days::new(rng.next_u64() % DAYS));
        cols.region.push(*region);
        cols.state.push(*state);
        cols.city.push(*city);
        cols.category.push(*category);
        cols.sub_category.push(*sub_category);
        cols.segment.push(*rng.pick(&SEGMENTS));
        cols.sales.push(sales);
        cols.profit.push(round2(sales * margin));
        cols.quantity.push(quantity);
    }
    cols
}

fn write_csv(cols: &Columns, path: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    wtr.write_record([
        "Row ID", ORDER_DATE, REGION, STATE, CITY, CATEGORY, SUB_CATEGORY, SEGMENT, SALES, PROFIT,
        QUANTITY,
    ])?;
    for i in 0..cols.row_id.len() {
        wtr.write_record([
            cols.row_id[i].to_string(),
            cols.order_date[i].format("%d/%m/%Y").to_string(),
            cols.region[i].to_string(),
            cols.state[i].to_string(),
            cols.city[i].to_string(),
            cols.category[i].to_string(),
            cols.sub_category[i].to_string(),
            cols.segment[i].to_string(),
            cols.sales[i].to_string(),
            cols.profit[i].to_string(),
            cols.quantity[i].to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn text_column(values: &[&str]) -> ArrayRef {
    Arc::new(StringArray::from(values.to_vec()))
}

fn to_batch(cols: &Columns) -> Result<RecordBatch> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch date")?;
    let days: Vec<i32> = cols
        .order_date
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("Row ID", DataType::Int64, false),
        Field::new(ORDER_DATE, DataType::Date32, false),
        Field::new(REGION, DataType::Utf8, false),
        Field::new(STATE, DataType::Utf8, false),
        Field::new(CITY, DataType::Utf8, false),
        Field::new(CATEGORY, DataType::Utf8, false),
        Field::new(SUB_CATEGORY, DataType::Utf8, false),
        Field::new(SEGMENT, DataType::Utf8, false),
        Field::new(SALES, DataType::Float64, false),
        Field::new(PROFIT, DataType::Float64, false),
        Field::new(QUANTITY, DataType::Int64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(cols.row_id.clone())),
        Arc::new(Date32Array::from(days)),
        text_column(&cols.region),
        text_column(&cols.state),
        text_column(&cols.city),
        text_column(&cols.category),
        text_column(&cols.sub_category),
        text_column(&cols.segment),
        Arc::new(Float64Array::from(cols.sales.clone())),
        Arc::new(Float64Array::from(cols.profit.clone())),
        Arc::new(Int64Array::from(cols.quantity.clone())),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).context("start date")?;
    let cols = generate(&mut rng, start);

    let csv_path = "Superstore.csv";
    write_csv(&cols, csv_path)?;

    let batch = to_batch(&cols)?;
    print_batches(&[batch.slice(0, 5)])?;

    let parquet_path = "Superstore.parquet";
    let file = std::fs::File::create(parquet_path)
        .with_context(|| format!("creating {parquet_path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!("Wrote {ROWS} orders to {csv_path} and {parquet_path}");
    Ok(())
}
