//! Functionality related to the `qcpp-report list` command itself.

use clap::Args;
use prettytable::row;
use prettytable::Table;

use crate::stages::StageKind;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `qcpp-report list`.
#[derive(Args)]
pub struct ListArgs {}

//==============//
// Main command //
//==============//

/// Builds the table of supported stage types.
pub fn stage_table() -> Table {
    let mut table = Table::new();

    table.add_row(row!["Tag", "Template", "Description"]);
    for kind in StageKind::ALL {
        table.add_row(row![kind.tag(), kind.template().file_name(), kind.description()]);
    }

    table
}

/// Main method for the `qcpp-report list` subcommand.
pub fn list(_: ListArgs) -> anyhow::Result<()> {
    println!("Stage Types:");
    println!();
    stage_table().printstd();

    Ok(())
}
