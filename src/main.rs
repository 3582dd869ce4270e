// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! sseq-chart CLI entrypoint.
//!
//! Loads a chart document, folds a JSON-lines message stream into it and prints what would be
//! drawn on one page as JSON.

use std::error::Error;
use std::path::Path;

use sseq_chart::model::{Page, SseqChart};
use sseq_chart::query::{BoundingBox, DrawSnapshot};
use sseq_chart::store::{read_messages, ChartFile, WriteDurability};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SSEQ_CHART_LOG";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<chart.json>] [--messages <file.jsonl>] [--page <n|inf>] [--x-range <a:b>] [--y-range <a:b>] [--save <out.json>] [--durable-writes]\n\nWithout <chart.json> an empty two-grading chart is used.\n--page defaults to the start of the chart's first page range.\n--x-range/--y-range default to the chart's current ranges.\n\nLogging goes to stderr; set {LOG_ENV} (e.g. {LOG_ENV}=debug) to change the level."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    chart: Option<String>,
    messages: Option<String>,
    page: Option<Page>,
    x_range: Option<[i64; 2]>,
    y_range: Option<[i64; 2]>,
    save: Option<String>,
    durable_writes: bool,
}

fn parse_page(raw: &str) -> Result<Page, ()> {
    match raw {
        "inf" | "infinity" => Ok(Page::Infinity),
        _ => raw.parse::<i32>().map(Page::from).map_err(|_| ()),
    }
}

fn parse_range(raw: &str) -> Result<[i64; 2], ()> {
    let (min, max) = raw.split_once(':').ok_or(())?;
    let min: i64 = min.trim().parse().map_err(|_| ())?;
    let max: i64 = max.trim().parse().map_err(|_| ())?;
    if min > max {
        return Err(());
    }
    Ok([min, max])
}

fn set_once<T>(slot: &mut Option<T>, value: T) -> Result<(), ()> {
    if slot.is_some() {
        return Err(());
    }
    *slot = Some(value);
    Ok(())
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--messages" => set_once(&mut options.messages, args.next().ok_or(())?)?,
            "--save" => set_once(&mut options.save, args.next().ok_or(())?)?,
            "--page" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.page, parse_page(&raw)?)?;
            }
            "--x-range" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.x_range, parse_range(&raw)?)?;
            }
            "--y-range" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.y_range, parse_range(&raw)?)?;
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => set_once(&mut options.chart, arg)?,
        }
    }

    if options.durable_writes && options.save.is_none() {
        return Err(());
    }

    Ok(options)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "sseq-chart".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };
        init_tracing();

        let mut chart = match &options.chart {
            Some(path) => ChartFile::new(path).load()?,
            None => SseqChart::new("chart", 2)?,
        };

        if let Some(path) = &options.messages {
            let messages = read_messages(Path::new(path))?;
            let count = messages.len();
            for message in messages {
                chart.apply_message(message)?;
            }
            info!(messages = count, "applied message stream");
        }

        let page = options
            .page
            .or_else(|| chart.settings().page_list.first().map(|range| range.start))
            .unwrap_or(Page::Finite(2));
        let chart_box = BoundingBox::of_chart(&chart);
        let bbox = BoundingBox::new(
            options.x_range.unwrap_or([chart_box.x_min, chart_box.x_max]),
            options.y_range.unwrap_or([chart_box.y_min, chart_box.y_max]),
        );

        let elements = chart.get_elements_to_draw(page, bbox);
        let snapshot = DrawSnapshot::resolve(&chart, page, &elements);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);

        if let Some(path) = &options.save {
            let durability = if options.durable_writes {
                WriteDurability::Durable
            } else {
                WriteDurability::BestEffort
            };
            ChartFile::new(path).with_durability(durability).save(&chart)?;
        }

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("sseq-chart: {err}");
        std::process::exit(1);
    }
}
