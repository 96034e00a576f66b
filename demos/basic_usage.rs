//! # hty-storage-engine 使用案例
//!
//! 1. 由 CSV 生成 HTY 文件
//! 2. 读取尾部元数据
//! 3. 单列 / 多列投影
//! 4. 过滤与过滤+投影
//! 5. copy-rewrite 追加行并校验新版本

use hty_storage_engine::{
    options::{AppendOptions, IngestOptions},
    Cell, CompareOp, HtyTable,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 引擎的 tracing 事件由这里注入的 subscriber 输出
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("═══════════════════════════════════════════════════════════");
    println!("   hty-storage-engine 演示                                 ");
    println!("═══════════════════════════════════════════════════════════\n");

    let dir = std::env::temp_dir().join("hty-demo");
    std::fs::create_dir_all(&dir)?;

    // =========================================================================
    // 1. CSV → HTY
    // =========================================================================
    println!("【1】CSV → HTY ...");
    let csv = dir.join("employees.csv");
    std::fs::write(
        &csv,
        "id,age,salary,rating\n1,25,50000.0,4.1\n2,42,49000.0,3.8\n3,33,51000.0,4.7\n",
    )?;
    let table = HtyTable::create_from_csv(&csv, dir.join("employees.hty"), &IngestOptions::default())?;
    println!("    path = {}\n", table.path().display());

    // =========================================================================
    // 2. 元数据
    // =========================================================================
    println!("【2】Metadata ...");
    let meta = table.metadata();
    println!("    num_rows = {}", meta.num_rows);
    for (i, g) in meta.groups.iter().enumerate() {
        let cols: Vec<String> = g.columns.iter()
            .map(|c| format!("{}:{}", c.name, c.column_type))
            .collect();
        println!("    group {i} @ {} → {}", g.offset, cols.join(", "));
    }
    println!();

    // =========================================================================
    // 3. 投影
    // =========================================================================
    println!("【3】Project salary ...");
    for cell in table.column("salary")? {
        println!("    {cell}");
    }
    println!("\n【3】Project all columns ...");
    print!("{}", table.project_all()?);
    println!();

    // =========================================================================
    // 4. 过滤
    // =========================================================================
    let op = CompareOp::try_from(2)?;
    println!("【4】Filter salary {op} 50000 ...");
    println!("    rows = {:?}", table.filter("salary", op, 50000.0)?);
    let names = meta.column_names();
    let filtered = table.project_and_filter(&names, "salary", op, 50000.0)?;
    print!("{}", filtered.result);
    println!("    skipped = {}\n", filtered.skipped_indices);

    // =========================================================================
    // 5. 追加行
    // =========================================================================
    println!("【5】Append rows → employees_v2.hty ...");
    let rows = vec![
        vec![Cell::Int(7), Cell::Int(20), Cell::from_f32(90000.3), Cell::from_f32(3.1)],
        vec![Cell::Int(8), Cell::Int(31), Cell::from_f32(32000.2), Cell::from_f32(2.9)],
        vec![Cell::Int(9), Cell::Int(24), Cell::from_f32(85000.8), Cell::from_f32(4.6)],
    ];
    let v2 = table.append(dir.join("employees_v2.hty"), &rows, &AppendOptions::default())?;
    let reopened = HtyTable::open(v2.path())?;
    assert_eq!(reopened.num_rows(), table.num_rows() + rows.len() as u64);
    print!("{}", reopened.project_all()?);
    println!("\n    ✓ OK");
    Ok(())
}
