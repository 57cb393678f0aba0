#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::pedantic)]
#![allow(warnings)]

use plotters::prelude::*;
use rand::Rng;

// Slot count of the simulated table; a power of two so masking replaces modulo.
const TABLE_SIZE: usize = 1 << 20;
// Load factors from 0.1 to 0.95 with 10 steps
const NUM_LOAD_FACTORS: usize = 10;

// Hashing/workload combinations to compare
const METHODS: [&str; 4] =
    ["Phi + Strided Ids", "Raw + Strided Ids", "Phi + Random Keys", "Raw + Random Keys"];
const MAX_PROBES: usize = 100; // Prevent unbounded scans once a cluster degenerates

// The scramble used by the real map: golden-ratio multiply, then fold the
// high bits down so the masked low bits carry entropy from the whole key.
fn phi_mix(key: u64) -> u64 {
    let h = key.wrapping_mul(0x9E37_79B9);
    h ^ (h >> 16)
}

// Raw masking baseline: index directly with the key's low bits.
fn raw_index(key: u64) -> u64 {
    key
}

// Linear probing insert; returns the number of probes spent.
fn probed_insert(table: &mut Vec<Option<u64>>, key: u64, hash: fn(u64) -> u64) -> usize {
    let mask = TABLE_SIZE - 1;
    let mut index = (hash(key) as usize) & mask;
    let mut probes = 1; // Start with first probe attempt

    while table[index].is_some() && probes < MAX_PROBES {
        index = (index + 1) & mask;
        probes += 1;
    }

    if table[index].is_none() {
        table[index] = Some(key);
    }

    probes
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate load factors from 0.1 to 0.95
    let load_factors: Vec<f64> = (0..NUM_LOAD_FACTORS)
        .map(|i| 0.1 + (0.95 - 0.1) * (i as f64) / ((NUM_LOAD_FACTORS - 1) as f64))
        .collect();

    // Calculate number of keys for each load factor
    let num_keys: Vec<usize> =
        load_factors.iter().map(|&load| (TABLE_SIZE as f64 * load) as usize).collect();

    println!("Load factors: {:?}", load_factors);
    println!("Number of keys: {:?}", num_keys);

    // Results storage
    let mut average_probes: Vec<Vec<f64>> = vec![Vec::new(); METHODS.len()];
    let mut worst_case_probes: Vec<Vec<usize>> = vec![Vec::new(); METHODS.len()];

    let max_keys_needed = *num_keys.iter().max().unwrap();

    // Strided ids model the clustered workloads (row ids, page-aligned
    // offsets) that defeat raw low-bit indexing.
    let strided_keys: Vec<u64> = (1..=max_keys_needed as u64).map(|i| i * 1024).collect();

    // Random keys generated outside the loop to ensure fair comparison
    let mut rng = rand::rng();
    let random_keys: Vec<u64> =
        (0..max_keys_needed).map(|_| rng.random_range(1..u64::MAX)).collect();

    // Running experiments
    for &n_keys in &num_keys {
        println!("Testing with {} keys", n_keys);

        for (method_idx, &method) in METHODS.iter().enumerate() {
            let mut table: Vec<Option<u64>> = vec![None; TABLE_SIZE];
            let mut probes_list: Vec<usize> = Vec::with_capacity(n_keys);

            let (keys, hash): (&[u64], fn(u64) -> u64) = match method {
                "Phi + Strided Ids" => (&strided_keys, phi_mix),
                "Raw + Strided Ids" => (&strided_keys, raw_index),
                "Phi + Random Keys" => (&random_keys, phi_mix),
                "Raw + Random Keys" => (&random_keys, raw_index),
                _ => panic!("Unknown method"),
            };

            for &key in keys.iter().take(n_keys) {
                probes_list.push(probed_insert(&mut table, key, hash));
            }

            // Calculate statistics
            let avg_probes = probes_list.iter().sum::<usize>() as f64 / probes_list.len() as f64;
            let worst_case = *probes_list.iter().max().unwrap_or(&0);

            // Store results
            average_probes[method_idx].push(avg_probes);
            worst_case_probes[method_idx].push(worst_case);

            println!("  {}: Avg probes = {:.2}, Worst = {}", method, avg_probes, worst_case);
        }
    }

    // Plot configuration
    let font_family = "sans-serif";

    let colors = [
        RGBColor(220, 50, 50),  // Bright red
        RGBColor(50, 90, 220),  // Bright blue
        RGBColor(50, 180, 50),  // Bright green
        RGBColor(180, 50, 180), // Bright magenta
    ];

    let line_width = 2;
    let marker_size = 4;
    let text_size = 16;
    let title_size = 35;

    // Custom x-axis labels shared by both charts
    let x_labels: Vec<String> = num_keys.iter().map(|&n| n.to_string()).collect();

    // Plot 1: Average probe count per insert
    let root = BitMapBackend::new("average_probe_count.png", (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_avg = average_probes
        .iter()
        .flat_map(|v| v.iter())
        .fold(0.0, |max, &x| if x > max { x } else { max }) *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption("Average Probes: Scrambled vs Raw Slot Indexing", (font_family, title_size))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .right_y_label_area_size(10)
        .build_cartesian_2d(0..(num_keys.len() - 1), 0.0..max_avg)?;

    chart
        .configure_mesh()
        .x_labels(num_keys.len() - 1)
        .x_label_formatter(&|x| {
            if *x < x_labels.len() { x_labels[*x].clone() } else { "".to_string() }
        })
        .x_desc("Number of Keys Inserted")
        .y_desc("Average Probes per Insert")
        .axis_desc_style((font_family, text_size))
        .draw()?;

    for (method_idx, &method) in METHODS.iter().enumerate() {
        let color = &colors[method_idx % colors.len()];
        let line_style = ShapeStyle::from(color).stroke_width(line_width);

        chart
            .draw_series(LineSeries::new(
                (0..num_keys.len() - 1).map(|i| (i, average_probes[method_idx][i])),
                line_style,
            ))?
            .label(method)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series((0..num_keys.len() - 1).map(|i| {
            Circle::new((i, average_probes[method_idx][i]), marker_size, color.filled())
        }))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    // Plot 2: Worst-case probe count
    let root = BitMapBackend::new("worst_case_probe_count.png", (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_worst = worst_case_probes
        .iter()
        .flat_map(|v| v.iter())
        .fold(0, |max, &x| if x > max { x } else { max }) as f64 *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption("Worst-Case Probes: Scrambled vs Raw Slot Indexing", (font_family, title_size))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .right_y_label_area_size(10)
        .build_cartesian_2d(0..(num_keys.len() - 1), 0.0..max_worst)?;

    chart
        .configure_mesh()
        .x_labels(num_keys.len() - 1)
        .x_label_formatter(&|x| {
            if *x < x_labels.len() { x_labels[*x].clone() } else { "".to_string() }
        })
        .x_desc("Number of Keys Inserted")
        .y_desc("Worst-Case Probe Count")
        .axis_desc_style((font_family, text_size))
        .draw()?;

    // Mark the cap so saturated series are readable as "degenerate"
    let cap_style = ShapeStyle::from(&RED.mix(0.3)).stroke_width(1);
    chart
        .draw_series(LineSeries::new(
            vec![(0, MAX_PROBES as f64), (num_keys.len() - 1, MAX_PROBES as f64)],
            cap_style,
        ))?
        .label("Probe Cap")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], cap_style));

    for (method_idx, &method) in METHODS.iter().enumerate() {
        let color = &colors[method_idx % colors.len()];
        let line_style = ShapeStyle::from(color).stroke_width(line_width);

        chart
            .draw_series(LineSeries::new(
                (0..num_keys.len() - 1).map(|i| (i, worst_case_probes[method_idx][i] as f64)),
                line_style,
            ))?
            .label(method)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series((0..num_keys.len() - 1).map(|i| {
            Circle::new((i, worst_case_probes[method_idx][i] as f64), marker_size, color.filled())
        }))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    println!(
        "Generated plot images: average_probe_count.png, worst_case_probe_count.png"
    );

    Ok(())
}
