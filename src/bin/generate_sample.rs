use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.range(0, items.len() as u64 - 1) as usize]
    }
}

const CATEGORIES: [&str; 12] = [
    "cama_mesa_banho",
    "beleza_saude",
    "esporte_lazer",
    "moveis_decoracao",
    "informatica_acessorios",
    "utilidades_domesticas",
    "relogios_presentes",
    "telefonia",
    "ferramentas_jardim",
    "automotivo",
    "brinquedos",
    "perfumaria",
];

const PAYMENT_TYPES: [&str; 4] = ["credit_card", "boleto", "voucher", "debit_card"];

const STATUSES: [&str; 4] = ["delivered", "delivered", "shipped", "canceled"];

fn stamp(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn opt(value: Option<String>) -> String {
    value.unwrap_or_default()
}

fn write_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create output file");
    writer.write_record(header).expect("Failed to write header");
    for row in rows {
        writer.write_record(row).expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush writer");
}

fn main() {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);
    let first_day = NaiveDate::from_ymd_opt(2017, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start date");
    let span_minutes = 600 * 24 * 60;

    // ---- Products ----
    let mut products = Vec::new();
    for i in 0..60 {
        let category = (!rng.chance(0.05)).then(|| rng.pick(&CATEGORIES).to_string());
        let measure = |rng: &mut SimpleRng, lo, hi| {
            (!rng.chance(0.02)).then(|| rng.range(lo, hi).to_string())
        };
        products.push(vec![
            format!("prod-{i:03}"),
            opt(category),
            opt(measure(&mut rng, 20, 60)),
            opt(measure(&mut rng, 100, 2000)),
            opt(measure(&mut rng, 1, 6)),
            opt(measure(&mut rng, 100, 15000)),
            opt(measure(&mut rng, 10, 80)),
            opt(measure(&mut rng, 5, 60)),
            opt(measure(&mut rng, 10, 60)),
        ]);
    }

    // ---- Customers: mostly one-off, a few regulars ----
    let mut customer_of_order: Vec<String> = Vec::new();
    for i in 0..900 {
        customer_of_order.push(format!("cust-{:04}", i % 700));
    }
    customer_of_order.extend((0..14).map(|_| "cust-regular".to_string()));
    customer_of_order.extend((0..35).map(|_| "cust-reseller".to_string()));

    // ---- Orders, payments, items, reviews ----
    let mut orders = Vec::new();
    let mut payments = Vec::new();
    let mut items = Vec::new();
    let mut reviews = Vec::new();

    for (n, customer) in customer_of_order.iter().enumerate() {
        let order_id = format!("ord-{n:05}");
        let purchased = first_day + Duration::minutes(rng.range(0, span_minutes) as i64);
        let approved = purchased + Duration::minutes(rng.range(5, 600) as i64);
        let carrier = approved + Duration::hours(rng.range(12, 96) as i64);
        let delivered = carrier + Duration::hours(rng.range(24, 400) as i64);
        let estimated = purchased + Duration::days(rng.range(15, 40) as i64);
        let status = *rng.pick(&STATUSES);
        let shipped = status != "canceled";

        orders.push(vec![
            order_id.clone(),
            customer.clone(),
            if rng.chance(0.01) { String::new() } else { status.to_string() },
            stamp(purchased),
            opt((!rng.chance(0.02)).then(|| stamp(approved))),
            opt(shipped.then(|| stamp(carrier))),
            opt((status == "delivered").then(|| stamp(delivered))),
            stamp(estimated),
        ]);

        let mut total = 0.0;
        for item_no in 1..=rng.range(1, 3) {
            let price = (rng.range(990, 49990) as f64) / 100.0;
            let freight = (rng.range(500, 4000) as f64) / 100.0;
            total += price + freight;
            let seller = (!rng.chance(0.01)).then(|| format!("seller-{:02}", rng.range(0, 19)));
            items.push(vec![
                order_id.clone(),
                item_no.to_string(),
                rng.pick(&products)[0].clone(),
                opt(seller),
                stamp(purchased + Duration::days(6)),
                format!("{price:.2}"),
                format!("{freight:.2}"),
            ]);
        }

        let split = if rng.chance(0.1) { 2 } else { 1 };
        for seq in 1..=split {
            let kind = if seq == 1 { *rng.pick(&PAYMENT_TYPES) } else { "voucher" };
            payments.push(vec![
                order_id.clone(),
                seq.to_string(),
                kind.to_string(),
                rng.range(1, 10).to_string(),
                format!("{:.2}", total / split as f64),
            ]);
        }

        if rng.chance(0.95) {
            let score = if status == "canceled" { rng.range(1, 2) } else { rng.range(2, 5) };
            let title = rng.chance(0.15).then(|| "recomendo".to_string());
            let message = rng.chance(0.4).then(|| "produto chegou no prazo".to_string());
            let created = delivered + Duration::days(1);
            reviews.push(vec![
                format!("rev-{n:05}"),
                order_id.clone(),
                score.to_string(),
                opt(title),
                opt(message),
                stamp(created),
                stamp(created + Duration::hours(rng.range(1, 72) as i64)),
            ]);
        }
    }

    // A few exact duplicates for the cleaner to find.
    for table in [&mut orders, &mut items, &mut reviews] {
        let dupes: Vec<Vec<String>> = table.iter().step_by(97).cloned().collect();
        table.extend(dupes);
    }

    write_csv(
        &out_dir.join("products_dataset.csv"),
        &[
            "product_id",
            "product_category_name",
            "product_name_lenght",
            "product_description_lenght",
            "product_photos_qty",
            "product_weight_g",
            "product_length_cm",
            "product_height_cm",
            "product_width_cm",
        ],
        &products,
    );
    write_csv(
        &out_dir.join("orders_dataset.csv"),
        &[
            "order_id",
            "customer_id",
            "order_status",
            "order_purchase_timestamp",
            "order_approved_at",
            "order_delivered_carrier_date",
            "order_delivered_customer_date",
            "order_estimated_delivery_date",
        ],
        &orders,
    );
    write_csv(
        &out_dir.join("order_items_dataset.csv"),
        &[
            "order_id",
            "order_item_id",
            "product_id",
            "seller_id",
            "shipping_limit_date",
            "price",
            "freight_value",
        ],
        &items,
    );
    write_csv(
        &out_dir.join("order_payments_dataset.csv"),
        &[
            "order_id",
            "payment_sequential",
            "payment_type",
            "payment_installments",
            "payment_value",
        ],
        &payments,
    );
    write_csv(
        &out_dir.join("order_reviews_dataset.csv"),
        &[
            "review_id",
            "order_id",
            "review_score",
            "review_comment_title",
            "review_comment_message",
            "review_creation_date",
            "review_answer_timestamp",
        ],
        &reviews,
    );

    println!(
        "Wrote {} orders, {} items, {} payments, {} reviews, {} products to {}",
        orders.len(),
        items.len(),
        payments.len(),
        reviews.len(),
        products.len(),
        out_dir.display()
    );
}
