// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command, value_parser};
use std::path::PathBuf;

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    ]
}

fn financial_args() -> [Arg; 6] {
    [
        Arg::new("down_payment")
            .long("down-payment")
            .help("Down payment, e.g. 80000 or $80,000"),
        Arg::new("term")
            .long("term")
            .value_parser(["15", "30"])
            .help("Loan term in years"),
        Arg::new("tax_rate")
            .long("tax-rate")
            .help("Annual property tax rate (%)"),
        Arg::new("pmi_rate")
            .long("pmi-rate")
            .help("Annual PMI rate (%)"),
        Arg::new("income")
            .long("income")
            .help("Gross monthly income"),
        Arg::new("debts")
            .long("debts")
            .help("Other monthly debt payments"),
    ]
}

fn id_arg() -> Arg {
    Arg::new("id").long("id").required(true).help("Property id")
}

fn property_field_args(required: bool) -> [Arg; 8] {
    [
        Arg::new("address").long("address").required(required),
        Arg::new("price").long("price").required(required),
        Arg::new("beds").long("beds").required(required),
        Arg::new("baths").long("baths").required(required),
        Arg::new("sqft").long("sqft").required(required).help("Square feet (> 0)"),
        Arg::new("acres").long("acres").help("Lot size in acres"),
        Arg::new("status")
            .long("status")
            .help("interested|viewed|contacted|passed"),
        Arg::new("notes").long("notes"),
    ]
}

fn calc_cmd() -> Command {
    Command::new("calc")
        .about("Mortgage affordability calculator")
        .subcommand_required(true)
        .subcommand(
            Command::new("grid")
                .about("Monthly payment grid across home prices and interest rates")
                .args(financial_args())
                .args(json_args()),
        )
        .subcommand(
            Command::new("payment")
                .about("Payment breakdown and affordability for one price and rate")
                .arg(Arg::new("price").long("price").required(true))
                .arg(
                    Arg::new("rate")
                        .long("rate")
                        .required(true)
                        .help("Annual interest rate (%)"),
                )
                .args(financial_args())
                .args(json_args()),
        )
        .subcommand(
            Command::new("defaults")
                .about("Stored calculator inputs")
                .subcommand_required(true)
                .subcommand(Command::new("show"))
                .subcommand(Command::new("set").args(financial_args())),
        )
}

fn property_cmd() -> Command {
    Command::new("property")
        .about("Saved properties")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Save a property")
                .args(property_field_args(true)),
        )
        .subcommand(
            Command::new("list")
                .about("List saved properties")
                .arg(
                    Arg::new("search")
                        .long("search")
                        .help("Case-insensitive address substring"),
                )
                .arg(
                    Arg::new("status")
                        .long("status")
                        .action(ArgAction::Append)
                        .help("Repeatable; matches any"),
                )
                .arg(Arg::new("min_price").long("min-price"))
                .arg(Arg::new("max_price").long("max-price"))
                .arg(Arg::new("min_beds").long("min-beds"))
                .arg(Arg::new("min_baths").long("min-baths"))
                .arg(Arg::new("min_sqft").long("min-sqft"))
                .arg(Arg::new("max_sqft").long("max-sqft"))
                .arg(
                    Arg::new("max_ppsf")
                        .long("max-ppsf")
                        .help("Maximum price per square foot"),
                )
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .default_value("date-added-desc")
                        .help(
                            "date-added|price|price-per-sqft|square-feet|acreage, \
                             optionally suffixed -asc or -desc",
                        ),
                )
                .arg(
                    Arg::new("page")
                        .long("page")
                        .value_parser(value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("page_size")
                        .long("page-size")
                        .value_parser(value_parser!(usize))
                        .default_value("10")
                        .help("0 lists everything"),
                )
                .args(json_args()),
        )
        .subcommand(Command::new("show").arg(id_arg()).args(json_args()))
        .subcommand(
            Command::new("edit")
                .about("Change fields of a saved property")
                .arg(id_arg())
                .args(property_field_args(false)),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(
            Command::new("status")
                .arg(id_arg())
                .arg(Arg::new("status").long("status").required(true))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(
            Command::new("view")
                .about("Record a viewing")
                .arg(id_arg())
                .arg(Arg::new("date").long("date").required(true))
                .arg(Arg::new("notes").long("notes").default_value("")),
        )
        .subcommand(
            Command::new("export")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .required(true)
                        .help("csv|json"),
                )
                .arg(Arg::new("out").long("out").required(true)),
        )
}

fn map_cmd() -> Command {
    Command::new("map")
        .about("Plot saved properties")
        .subcommand_required(true)
        .subcommand(Command::new("markers").args(json_args()))
        .subcommand(
            Command::new("geojson").arg(
                Arg::new("out")
                    .long("out")
                    .help("Write to a file instead of stdout"),
            ),
        )
}

pub fn build_cli() -> Command {
    command!()
        .name("homescope")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("SQLite database path (overrides HOMESCOPE_DB)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(calc_cmd())
        .subcommand(property_cmd())
        .subcommand(map_cmd())
}
