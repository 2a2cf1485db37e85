use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use arrow::array::Array;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{Amount, Dataset, Order, OrderItem, Payment, Product, Review, Stamp};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// File stems of the five source tables inside a dataset directory.
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    pub orders: String,
    pub payments: String,
    pub order_items: String,
    pub products: String,
    pub reviews: String,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            orders: "orders_dataset".into(),
            payments: "order_payments_dataset".into(),
            order_items: "order_items_dataset".into(),
            products: "products_dataset".into(),
            reviews: "order_reviews_dataset".into(),
        }
    }
}

/// Load all five tables from `dir` using the default file names.
pub fn load_dataset(dir: &Path) -> Result<Dataset> {
    load_dataset_with(dir, &DatasetLayout::default())
}

/// Load all five tables from `dir`. Any unreadable table fails the whole load.
pub fn load_dataset_with(dir: &Path, layout: &DatasetLayout) -> Result<Dataset> {
    let dataset = Dataset {
        orders: load_records(dir, &layout.orders)?,
        payments: load_records(dir, &layout.payments)?,
        order_items: load_records(dir, &layout.order_items)?,
        products: load_records(dir, &layout.products)?,
        reviews: load_records(dir, &layout.reviews)?,
    };
    for (table, rows) in dataset.row_counts() {
        log::info!("Loaded {rows} {table} rows");
    }
    Ok(dataset)
}

fn load_records<T: TableRecord>(dir: &Path, stem: &str) -> Result<Vec<T>> {
    let path = locate(dir, stem)?;
    let table = load_table(&path).with_context(|| format!("reading {}", path.display()))?;
    table
        .records()
        .with_context(|| format!("decoding {}", path.display()))
}

/// First existing `<stem>.<ext>` in `dir`, by extension preference.
fn locate(dir: &Path, stem: &str) -> Result<PathBuf, DataError> {
    ["csv", "parquet", "pq", "json"]
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
        .ok_or_else(|| DataError::TableNotFound {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
        })
}

/// Read a table file into its untyped form.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, empty cells are nulls
/// * `.parquet` – any column types, rendered to text
/// * `.json`    – `[{ "order_id": "...", ... }, ...]`
pub fn load_table(path: &Path) -> Result<RawTable, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string();

    match ext.as_str() {
        "csv" => RawTable::from_csv_reader(name, std::fs::File::open(path)?),
        "json" => RawTable::from_json_str(name, &std::fs::read_to_string(path)?),
        "parquet" | "pq" => RawTable::from_parquet(name, path),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// RawTable – header + text cells, independent of the file format
// ---------------------------------------------------------------------------

/// A table as read from disk: column names and nullable text cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn from_csv_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new().from_reader(reader);
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows: Vec<Vec<Option<String>>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                    .collect(),
            );
        }

        Ok(Self {
            name: name.into(),
            headers,
            rows,
        })
    }

    /// Records-oriented JSON, the default `df.to_json(orient='records')`.
    pub fn from_json_str(name: impl Into<String>, text: &str) -> Result<Self, DataError> {
        let root: JsonValue = serde_json::from_str(text)?;
        let records = root
            .as_array()
            .ok_or_else(|| DataError::JsonShape("expected top-level JSON array".into()))?;

        let mut headers: Vec<String> = Vec::new();
        let mut objects = Vec::with_capacity(records.len());
        for (i, rec) in records.iter().enumerate() {
            let obj = rec
                .as_object()
                .ok_or_else(|| DataError::JsonShape(format!("row {i} is not a JSON object")))?;
            for key in obj.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
            objects.push(obj);
        }

        let rows: Vec<Vec<Option<String>>> = objects
            .into_iter()
            .map(|obj| {
                headers
                    .iter()
                    .map(|h| obj.get(h).and_then(json_to_cell))
                    .collect()
            })
            .collect();

        Ok(Self {
            name: name.into(),
            headers,
            rows,
        })
    }

    /// Works with files written by both Pandas (`df.to_parquet()`) and
    /// Polars (`df.write_parquet()`).
    fn from_parquet(name: String, path: &Path) -> Result<Self, DataError> {
        let file = std::fs::File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let headers: Vec<String> = builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        let reader = builder.build()?;

        let options = FormatOptions::default();
        let mut rows: Vec<Vec<Option<String>>> = Vec::new();
        for batch in reader {
            let batch = batch?;
            let formatters = batch
                .columns()
                .iter()
                .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
                .collect::<Result<Vec<_>, _>>()?;

            for row in 0..batch.num_rows() {
                rows.push(
                    batch
                        .columns()
                        .iter()
                        .zip(&formatters)
                        .map(|(col, fmt)| {
                            (!col.is_null(row)).then(|| fmt.value(row).to_string())
                        })
                        .collect(),
                );
            }
        }

        Ok(Self {
            name,
            headers,
            rows,
        })
    }

    /// Fail unless every named column is present.
    pub fn require_columns(&self, columns: &[&str]) -> Result<(), DataError> {
        match columns.iter().find(|c| !self.headers.iter().any(|h| h == *c)) {
            Some(missing) => Err(DataError::MissingColumn {
                table: self.name.clone(),
                column: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Decode every row into a typed record.
    pub fn records<T: TableRecord>(&self) -> Result<Vec<T>, DataError> {
        self.require_columns(T::REQUIRED_COLUMNS)?;
        let index: HashMap<&str, usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();

        self.rows
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                T::from_row(&RowView {
                    table: &self.name,
                    row: i + 1,
                    cells,
                    index: &index,
                })
            })
            .collect()
    }
}

fn json_to_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// RowView – typed access to one row by column name
// ---------------------------------------------------------------------------

/// Borrowed view of one row with by-name cell lookup.
/// `row` is 1-based, for error messages.
pub struct RowView<'a> {
    table: &'a str,
    row: usize,
    cells: &'a [Option<String>],
    index: &'a HashMap<&'a str, usize>,
}

impl RowView<'_> {
    /// Trimmed cell text; `None` for null, blank, or an absent column.
    pub fn text(&self, column: &str) -> Option<&str> {
        let idx = *self.index.get(column)?;
        self.cells
            .get(idx)?
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn owned(&self, column: &str) -> Option<String> {
        self.text(column).map(str::to_string)
    }

    pub fn required(&self, column: &str) -> Result<&str, DataError> {
        self.text(column).ok_or_else(|| DataError::MissingValue {
            table: self.table.to_string(),
            row: self.row,
            column: column.to_string(),
        })
    }

    /// Parsed value; unparseable text counts as null.
    pub fn parse<T: FromStr>(&self, column: &str) -> Option<T> {
        self.text(column)?.parse().ok()
    }

    pub fn parse_required<T: FromStr>(&self, column: &str) -> Result<T, DataError> {
        let raw = self.required(column)?;
        raw.parse().map_err(|_| self.invalid(column, raw))
    }

    /// Non-negative whole number, also accepting float spellings like `"40.0"`.
    pub fn whole(&self, column: &str) -> Option<u32> {
        parse_whole(self.text(column)?)
    }

    pub fn whole_required(&self, column: &str) -> Result<u32, DataError> {
        let raw = self.required(column)?;
        parse_whole(raw).ok_or_else(|| self.invalid(column, raw))
    }

    pub fn timestamp(&self, column: &str) -> Option<NaiveDateTime> {
        parse_timestamp(self.text(column)?)
    }

    pub fn timestamp_required(&self, column: &str) -> Result<NaiveDateTime, DataError> {
        let raw = self.required(column)?;
        parse_timestamp(raw).ok_or_else(|| self.invalid(column, raw))
    }

    fn stamp(&self, column: &str) -> Stamp {
        match self.text(column) {
            None => Stamp::Missing,
            Some("Unknown") => Stamp::Unknown,
            Some(raw) => parse_timestamp(raw).map_or(Stamp::Missing, Stamp::Present),
        }
    }

    fn amount(&self, column: &str) -> Option<Amount> {
        self.parse::<f64>(column).filter(|v| v.is_finite()).map(Amount)
    }

    fn invalid(&self, column: &str, raw: &str) -> DataError {
        DataError::InvalidValue {
            table: self.table.to_string(),
            row: self.row,
            column: column.to_string(),
            value: raw.to_string(),
        }
    }
}

fn parse_whole(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64).then_some(f as u32)
}

/// Accepts `2017-10-02 10:56:33`, `2017-10-02T10:56:33` and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// ---------------------------------------------------------------------------
// TableRecord – per-table column mapping
// ---------------------------------------------------------------------------

/// A record type that can be decoded from a [`RowView`].
pub trait TableRecord: Sized {
    /// Columns whose absence makes the whole table unusable.
    const REQUIRED_COLUMNS: &'static [&'static str];

    fn from_row(row: &RowView<'_>) -> Result<Self, DataError>;
}

impl TableRecord for Order {
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["order_id", "customer_id", "order_purchase_timestamp"];

    fn from_row(row: &RowView<'_>) -> Result<Self, DataError> {
        Ok(Order {
            order_id: row.required("order_id")?.to_string(),
            customer_id: row.required("customer_id")?.to_string(),
            status: row.owned("order_status"),
            purchased_at: row.timestamp_required("order_purchase_timestamp")?,
            approved_at: row.stamp("order_approved_at"),
            delivered_carrier_at: row.stamp("order_delivered_carrier_date"),
            delivered_customer_at: row.stamp("order_delivered_customer_date"),
            estimated_delivery_at: row.stamp("order_estimated_delivery_date"),
        })
    }
}

impl TableRecord for Payment {
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["order_id", "payment_type", "payment_value"];

    fn from_row(row: &RowView<'_>) -> Result<Self, DataError> {
        Ok(Payment {
            order_id: row.required("order_id")?.to_string(),
            sequential: row.whole("payment_sequential"),
            payment_type: row.required("payment_type")?.to_string(),
            installments: row.whole("payment_installments"),
            value: Amount(row.parse_required("payment_value")?),
        })
    }
}

impl TableRecord for OrderItem {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["order_id", "product_id", "price"];

    fn from_row(row: &RowView<'_>) -> Result<Self, DataError> {
        Ok(OrderItem {
            order_id: row.owned("order_id"),
            order_item_id: row.whole("order_item_id"),
            product_id: row.owned("product_id"),
            seller_id: row.owned("seller_id"),
            shipping_limit_date: row.owned("shipping_limit_date"),
            price: row.amount("price"),
            freight_value: row.amount("freight_value"),
        })
    }
}

impl TableRecord for Product {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["product_id", "product_category_name"];

    fn from_row(row: &RowView<'_>) -> Result<Self, DataError> {
        // The published dataset spells these two columns "lenght".
        let either = |a: &str, b: &str| row.whole(a).or_else(|| row.whole(b));
        Ok(Product {
            product_id: row.required("product_id")?.to_string(),
            category_name: row.owned("product_category_name"),
            name_length: either("product_name_lenght", "product_name_length"),
            description_length: either("product_description_lenght", "product_description_length"),
            photos_qty: row.whole("product_photos_qty"),
            weight_g: row.whole("product_weight_g"),
            length_cm: row.whole("product_length_cm"),
            height_cm: row.whole("product_height_cm"),
            width_cm: row.whole("product_width_cm"),
        })
    }
}

impl TableRecord for Review {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["review_id", "order_id", "review_score"];

    fn from_row(row: &RowView<'_>) -> Result<Self, DataError> {
        let score = row.whole_required("review_score")?;
        Ok(Review {
            review_id: row.required("review_id")?.to_string(),
            order_id: row.required("order_id")?.to_string(),
            score: u8::try_from(score)
                .map_err(|_| row.invalid("review_score", &score.to_string()))?,
            comment_title: row.owned("review_comment_title"),
            comment_message: row.owned("review_comment_message"),
            created_at: row.owned("review_creation_date"),
            answered_at: row.owned("review_answer_timestamp"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDERS_CSV: &str = "\
order_id,customer_id,order_status,order_purchase_timestamp,order_approved_at,order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date
o1,c1,delivered,2017-10-02 10:56:33,2017-10-02 11:07:15,2017-10-04 19:55:00,2017-10-10 21:25:13,2017-10-18 00:00:00
o2,c2,,2018-07-24 20:41:37,,,,2018-08-13 00:00:00
";

    #[test]
    fn csv_orders_decode_with_nulls() {
        let table = RawTable::from_csv_reader("orders", ORDERS_CSV.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 2);

        let orders: Vec<Order> = table.records().unwrap();
        assert_eq!(orders[0].status.as_deref(), Some("delivered"));
        assert_eq!(
            orders[0].purchase_date(),
            NaiveDate::from_ymd_opt(2017, 10, 2).unwrap()
        );
        assert!(matches!(orders[0].approved_at, Stamp::Present(_)));
        assert_eq!(orders[1].status, None);
        assert_eq!(orders[1].approved_at, Stamp::Missing);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let csv = "order_id,order_status\no1,delivered\n";
        let table = RawTable::from_csv_reader("orders", csv.as_bytes()).unwrap();
        let err = table.records::<Order>().unwrap_err();
        assert!(matches!(
            err,
            DataError::MissingColumn { ref column, .. } if column == "customer_id"
        ));
    }

    #[test]
    fn malformed_purchase_timestamp_is_fatal() {
        let csv = "order_id,customer_id,order_purchase_timestamp\no1,c1,yesterday\n";
        let table = RawTable::from_csv_reader("orders", csv.as_bytes()).unwrap();
        let err = table.records::<Order>().unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { row: 1, .. }));
    }

    #[test]
    fn json_records_decode() {
        let json = r#"[
            {"product_id": "p1", "product_category_name": "perfumaria", "product_photos_qty": 1.0},
            {"product_id": "p2", "product_category_name": null, "product_weight_g": 500}
        ]"#;
        let table = RawTable::from_json_str("products", json).unwrap();
        let products: Vec<Product> = table.records().unwrap();
        assert_eq!(products[0].category_name.as_deref(), Some("perfumaria"));
        assert_eq!(products[0].photos_qty, Some(1));
        assert_eq!(products[1].category_name, None);
        assert_eq!(products[1].weight_g, Some(500));
    }

    #[test]
    fn items_keep_incomplete_rows_for_the_cleaner() {
        let csv = "order_id,order_item_id,product_id,seller_id,price\no1,1,p1,s1,10.5\no2,1,,s1,abc\n";
        let table = RawTable::from_csv_reader("order_items", csv.as_bytes()).unwrap();
        let items: Vec<OrderItem> = table.records().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].price, Some(Amount(10.5)));
        assert_eq!(items[1].product_id, None);
        assert_eq!(items[1].price, None);
    }

    #[test]
    fn timestamps_accept_common_layouts() {
        assert!(parse_timestamp("2018-01-05 08:00:00").is_some());
        assert!(parse_timestamp("2018-01-05T08:00:00").is_some());
        assert_eq!(
            parse_timestamp("2018-01-05"),
            NaiveDate::from_ymd_opt(2018, 1, 5).unwrap().and_hms_opt(0, 0, 0)
        );
        assert!(parse_timestamp("05/01/2018").is_none());
    }

    #[test]
    fn ragged_csv_row_is_fatal() {
        let csv = "order_id,customer_id,order_purchase_timestamp\n\
                   o1,c1,2017-10-02 10:56:33,extra\n";
        let err = RawTable::from_csv_reader("orders", csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Csv(_)));
    }

    #[test]
    fn parquet_orders_decode_through_the_formatter() {
        use std::sync::Arc;

        use arrow::array::{ArrayRef, StringArray, TimestampMicrosecondArray};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let micros = |s: &str| parse_timestamp(s).unwrap().and_utc().timestamp_micros();
        let columns: Vec<(&str, ArrayRef)> = vec![
            ("order_id", Arc::new(StringArray::from(vec!["o1", "o2"])) as ArrayRef),
            ("customer_id", Arc::new(StringArray::from(vec!["c1", "c2"])) as ArrayRef),
            (
                "order_status",
                Arc::new(StringArray::from(vec![Some("delivered"), None])) as ArrayRef,
            ),
            (
                "order_purchase_timestamp",
                Arc::new(TimestampMicrosecondArray::from(vec![
                    micros("2017-10-02 10:56:33"),
                    micros("2018-07-24 20:41:37.250"),
                ])) as ArrayRef,
            ),
            (
                "order_approved_at",
                Arc::new(TimestampMicrosecondArray::from(vec![
                    Some(micros("2017-10-02 11:07:15")),
                    None,
                ])) as ArrayRef,
            ),
        ];
        let batch = RecordBatch::try_from_iter(columns).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders_dataset.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][2], None);

        let orders: Vec<Order> = table.records().unwrap();
        assert_eq!(orders[0].status.as_deref(), Some("delivered"));
        assert_eq!(orders[1].status, None);
        assert_eq!(
            orders[0].purchased_at,
            NaiveDateTime::parse_from_str("2017-10-02 10:56:33", "%Y-%m-%d %H:%M:%S").unwrap()
        );
        assert_eq!(
            orders[1].purchase_date(),
            NaiveDate::from_ymd_opt(2018, 7, 24).unwrap()
        );
        assert!(matches!(orders[0].approved_at, Stamp::Present(_)));
        assert_eq!(orders[1].approved_at, Stamp::Missing);
    }

    #[test]
    fn blank_payment_counters_stay_null() {
        let csv = "order_id,payment_sequential,payment_type,payment_installments,payment_value\n\
                   o1,,credit_card,,10.0\n\
                   o1,1,credit_card,0,10.0\n";
        let payments: Vec<Payment> = RawTable::from_csv_reader("payments", csv.as_bytes())
            .unwrap()
            .records()
            .unwrap();
        assert_eq!(payments[0].sequential, None);
        assert_eq!(payments[0].installments, None);
        assert_eq!(payments[1].sequential, Some(1));
        assert_eq!(payments[1].installments, Some(0));
        assert_ne!(payments[0], payments[1]);
    }

    #[test]
    fn dataset_directory_loads_all_tables() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| std::fs::write(dir.path().join(name), body).unwrap();
        write("orders_dataset.csv", ORDERS_CSV);
        write(
            "order_payments_dataset.csv",
            "order_id,payment_sequential,payment_type,payment_installments,payment_value\no1,1,credit_card,2,99.9\n",
        );
        write(
            "order_items_dataset.csv",
            "order_id,order_item_id,product_id,seller_id,shipping_limit_date,price,freight_value\no1,1,p1,s1,2017-10-06 11:07:15,89.9,10.0\n",
        );
        write(
            "products_dataset.json",
            r#"[{"product_id": "p1", "product_category_name": "esporte_lazer"}]"#,
        );
        write(
            "order_reviews_dataset.csv",
            "review_id,order_id,review_score,review_comment_title,review_comment_message\nr1,o1,4,,ok\n",
        );

        let dataset = load_dataset(dir.path()).unwrap();
        assert_eq!(dataset.orders.len(), 2);
        assert_eq!(dataset.payments[0].value, Amount(99.9));
        assert_eq!(dataset.products[0].category_name.as_deref(), Some("esporte_lazer"));
        assert_eq!(dataset.reviews[0].score, 4);
        assert_eq!(dataset.reviews[0].comment_title, None);
    }

    #[test]
    fn absent_table_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("orders_dataset.csv"), ORDERS_CSV).unwrap();
        let err = load_dataset(dir.path()).unwrap_err();
        assert!(err.to_string().contains("order_payments_dataset"));
    }
}
