#![no_main]

//! Arbitrary bytes fed through load, format and save. Failures must surface
//! as errors, and anything that loads must format and save.

use libfuzzer_sys::fuzz_target;
use sheetfmt_core::{format_active_sheet, Workbook};

fuzz_target!(|data: &[u8]| {
    let Ok(mut workbook) = Workbook::load_from_bytes(data) else {
        return;
    };
    if workbook.worksheets().is_empty() {
        return;
    }
    format_active_sheet(&mut workbook).expect("formatting a loaded sheet");
    let saved = workbook.save_to_bytes().expect("saving a formatted workbook");
    Workbook::load_from_bytes(&saved).expect("reloading our own output");
});
