//! Performance benchmarks for the journal-voucher engine.
//!
//! This benchmark suite measures the aggregation engine on generated payroll
//! tables and the HTTP surface on a real workbook:
//! - Aggregation of 100, 1,000 and 10,000 payroll rows
//! - A plain journal request through the router
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use payroll_jv::api::{AppState, create_router};
use payroll_jv::config::{ConfigLoader, ServerConfig, ServiceConfig, WorkspaceConfig};
use payroll_jv::journal::{JournalContext, PostingPeriod, build_journal};
use payroll_jv::models::{CellValue, PayrollTable, SalaryComponent};

use axum::{body::Body, http::Request};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

const DEPARTMENTS: [f64; 6] = [3003.0, 3006.0, 4100.0, 4200.0, 5100.0, 9999.0];

/// Creates a payroll table with every component column populated.
fn create_table(rows: usize) -> PayrollTable {
    let mut columns = vec!["employee".to_string(), "departmentcode".to_string()];
    columns.extend(SalaryComponent::ALL.iter().map(|c| c.key().to_string()));

    let data = (0..rows)
        .map(|i| {
            let mut row = vec![
                CellValue::Text(format!("emp_{:05}", i)),
                CellValue::Number(DEPARTMENTS[i % DEPARTMENTS.len()]),
            ];
            row.extend(
                (0..SalaryComponent::ALL.len())
                    .map(|c| CellValue::Number(((i * 37 + c * 11) % 5000) as f64 + 0.25)),
            );
            row
        })
        .collect();

    PayrollTable::new(columns, data)
}

fn create_context() -> JournalContext {
    JournalContext {
        period: PostingPeriod::parse("31/01/26").expect("valid posting date"),
        journal_code: "PAYJV".to_string(),
    }
}

/// Writes a payroll workbook for the HTTP benchmark.
fn create_workbook(dir: &Path, rows: usize) -> PathBuf {
    let path = dir.join("payroll.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Payroll").unwrap();
    sheet.write_string(0, 0, "Department Code").unwrap();
    for (c, component) in SalaryComponent::ALL.iter().enumerate() {
        sheet.write_string(0, c as u16 + 1, component.label()).unwrap();
    }
    for i in 0..rows {
        let r = i as u32 + 1;
        sheet.write_number(r, 0, DEPARTMENTS[i % DEPARTMENTS.len()]).unwrap();
        for c in 0..SalaryComponent::ALL.len() {
            sheet
                .write_number(r, c as u16 + 1, ((i * 13 + c) % 3000) as f64)
                .unwrap();
        }
    }
    workbook.save(&path).unwrap();
    path
}

/// Benchmark: Aggregation at increasing row counts.
fn bench_aggregation(c: &mut Criterion) {
    let context = create_context();
    let mut group = c.benchmark_group("aggregation");

    for rows in [100usize, 1_000, 10_000].iter() {
        let table = create_table(*rows);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), rows, |b, _| {
            b.iter(|| {
                let batch = build_journal(black_box(&table), &SalaryComponent::ALL, &context)
                    .expect("aggregation succeeds");
                black_box(batch)
            })
        });
    }

    group.finish();
}

/// Benchmark: A plain journal request through the router.
fn bench_plain_request(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = TempDir::new().unwrap();
    let input = create_workbook(dir.path(), 500);
    let state = AppState::new(ConfigLoader::from_config(ServiceConfig {
        server: ServerConfig::default(),
        workspace: WorkspaceConfig {
            output_dir: dir.path().join("out"),
        },
        converter: None,
    }));
    let router = create_router(state);
    let body = serde_json::json!({
        "input_path": input,
        "sheet_name": "Payroll",
        "posting_date": "31/01/26",
        "journal_code": "PAYJV"
    })
    .to_string();

    let mut group = c.benchmark_group("http");
    group.sample_size(20);
    group.bench_function("plain_journal_500_rows", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/journal")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_aggregation, bench_plain_request);
criterion_main!(benches);
