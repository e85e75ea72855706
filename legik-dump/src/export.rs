// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use legik_core::lut::LookupTable;

use crate::config::OutputConfig;

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    Ok(BufWriter::new(file))
}

/// Write the C header, C source and reachability map.
pub(crate) fn write_all(table: &LookupTable, output: &OutputConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&output.directory)?;

    let path = output.header_path();
    let mut writer = create(&path)?;
    table.write_header(&mut writer, &output.name, &output.table)?;
    writer.flush()?;
    log::info!("Wrote {}", path.display());

    let path = output.source_path();
    let mut writer = create(&path)?;
    table.write_source(&mut writer, &output.name, &output.table)?;
    writer.flush()?;
    log::info!("Wrote {}", path.display());

    let path = output.graph_path();
    let mut writer = create(&path)?;
    table.write_graph(&mut writer)?;
    writer.flush()?;
    log::info!("Wrote {}", path.display());

    Ok(())
}
