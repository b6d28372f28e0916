//! # Disassembly Parser Tests
//!
//! Line filtering and memory-image formatting of `objdump -d` output.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use rvtest_core::image::{DisassemblyLines, Instruction, parse_line};

const LISTING: &str = "
addi.out:     file format elf32-littleriscv


Disassembly of section .text:

00000000 <_start>:
   0:\t00a50513          \taddi\ta0,a0,10
   4:\t4501                \tli\ta0,0
   8:\tFEDFF06F          \tj\t0 <_start>

0000000c <done>:
   c:\t00000073          \tecall
";

#[test]
fn test_parse_objdump_line() {
    let instruction = parse_line("1004:\t00a50513\taddi\ta0,a0,10").unwrap();
    assert_eq!(instruction.address, "1004");
    assert_eq!(instruction.encoding, 0x00a5_0513);
    assert_eq!(instruction.to_string(), "1004:   00a50513");
}

#[test]
fn test_parse_keeps_address_verbatim() {
    let instruction = parse_line("   0000001c:\t00000013\tnop").unwrap();
    assert_eq!(instruction.to_string(), "0000001c:   00000013");
}

#[test]
fn test_parse_address_without_colon() {
    let instruction = parse_line("1004 00a50513").unwrap();
    assert_eq!(instruction.to_string(), "1004:   00a50513");
}

#[test]
fn test_encoding_is_written_lowercase() {
    let instruction = parse_line("   8:\tFEDFF06F\tj\t0").unwrap();
    assert_eq!(instruction.encoding, 0xfedf_f06f);
    assert_eq!(instruction.to_string(), "8:   fedff06f");
}

#[rstest]
#[case::blank("")]
#[case::file_header("addi.out:     file format elf32-littleriscv")]
#[case::section_header("Disassembly of section .text:")]
#[case::label("00000000 <_start>:")]
#[case::compressed("   4:\t4501                \tli\ta0,0")]
#[case::short_encoding("   4:\t0513")]
#[case::glued_mnemonic("   0:\t00a50513addi")]
fn test_non_instruction_lines_are_skipped(#[case] line: &str) {
    assert_eq!(parse_line(line), None);
}

#[test]
fn test_listing_yields_instructions_in_order() {
    let mut lines = DisassemblyLines::new(Cursor::new(LISTING));
    let image: Vec<String> = lines
        .by_ref()
        .map(|instruction| instruction.unwrap().to_string())
        .collect();

    assert_eq!(
        image,
        vec!["0:   00a50513", "8:   fedff06f", "c:   00000073"]
    );
    assert_eq!(lines.skipped(), 10);
}

#[test]
fn test_empty_listing_yields_nothing() {
    let mut lines = DisassemblyLines::new(Cursor::new(""));
    assert!(lines.next().is_none());
    assert_eq!(lines.skipped(), 0);
}

#[test]
fn test_crlf_listing() {
    let lines: Vec<Instruction> = DisassemblyLines::new(Cursor::new("   0:\t00a50513\r\n"))
        .map(Result::unwrap)
        .collect();
    assert_eq!(
        lines,
        vec![Instruction {
            address: "0".to_string(),
            encoding: 0x00a5_0513,
        }]
    );
}

proptest! {
    #[test]
    fn prop_objdump_lines_round_trip_into_image_lines(address in any::<u32>(), encoding in any::<u32>()) {
        let line = format!("{address:>8x}:\t{encoding:08x}          \taddi\ta0,a0,10");
        let instruction = parse_line(&line).unwrap();
        prop_assert_eq!(instruction.to_string(), format!("{address:x}:   {encoding:08x}"));
    }

    #[test]
    fn prop_parse_never_panics(line in ".*") {
        let _ = parse_line(&line);
    }
}
