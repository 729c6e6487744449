use mips_sim::asm::build;
use mips_sim::memory::{MEMORY_WORDS, STATIC_DATA_BASE};
use mips_sim::{Bus, Conditions, CpuConfig, Exit, Isa, Machine, State, Trap};

fn machine(src: &str, cfg: CpuConfig) -> Machine {
    let (program, _) = build(&Isa::new(), src).unwrap();
    let mut m = Machine::new(cfg);
    m.load(&program).unwrap();
    m
}

#[test]
fn store_then_load_uses_byte_offsets() {
    let src = "
        lui  $t1, 0x1000
        addi $t0, $zero, 42
        sw   $t0, 8($t1)
        lw   $s0, 8($t1)
        sw   $t0, -4($t1)
        halt
    ";
    let mut m = machine(src, CpuConfig::default());
    m.run().unwrap();
    assert_eq!(m.mem.read_word(STATIC_DATA_BASE + 2).unwrap(), 42);
    assert_eq!(m.mem.read_word(STATIC_DATA_BASE - 1).unwrap(), 42);
    assert_eq!(m.cpu.gpr[16], 42);
}

#[test]
fn data_labels_as_immediates() {
    // the label's address is truncated to its low 16 bits, then lui supplies the top
    let src = "
        .data
        pad: .space 3
        val: .word -7
        .text
        lui $t1, 0x1000
        ori $t1, $t1, val
        lw  $t0, 0($t1)
        halt
    ";
    let mut m = machine(src, CpuConfig::default());
    m.run().unwrap();
    assert_eq!(m.cpu.gpr[9], STATIC_DATA_BASE + 3);
    assert_eq!(m.cpu.gpr[8], (-7i32) as u32);
}

#[test]
fn out_of_range_access_halts_by_default() {
    let mut m = machine("lui $t1, 0x8000\nlw $t0, 0($t1)\nhalt", CpuConfig::default());
    let trap = m.run().unwrap_err();
    match trap {
        Trap::Bus { addr, .. } => assert_eq!(addr, 0x8000_0000),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(m.state(), State::Halted(Exit::Fault));
}

#[test]
fn out_of_range_access_can_be_reported() {
    let cfg = CpuConfig { halt_on: Conditions::empty(), ..CpuConfig::default() };
    let mut m = machine("lui $t1, 0x8000\nsw $t0, 0($t1)\naddi $t2, $zero, 1\nhalt", cfg);
    let summary = m.run().unwrap();
    assert_eq!(summary.exit, Exit::Sentinel);
    assert_eq!(summary.reported.len(), 1);
    assert_eq!(summary.reported[0].condition(), Conditions::BUS);
    assert_eq!(m.cpu.gpr[10], 1);
}

#[test]
fn last_word_is_addressable() {
    let mut m = Machine::new(CpuConfig::default());
    m.mem.write_word(MEMORY_WORDS - 1, 9).unwrap();
    assert_eq!(m.mem.read_word(MEMORY_WORDS - 1).unwrap(), 9);
    assert!(m.mem.read_word(MEMORY_WORDS).is_err());
}

#[test]
fn data_label_as_memory_offset() {
    let src = "
        .data
        pad: .space 3
        val: .word 77
        .text
        lui $t1, 0x1000
        lw  $t2, val($t1)
        sw  $t2, pad($t1)
        halt
    ";
    let mut m = machine(src, CpuConfig::default());
    let summary = m.run().unwrap();
    assert!(summary.reported.is_empty());
    assert_eq!(m.cpu.gpr[10], 77);
    assert_eq!(m.mem.read_word(STATIC_DATA_BASE).unwrap(), 77);
}

#[test]
fn unaligned_offset_halts_by_default() {
    let mut m = machine("lui $t1, 0x1000\nlw $t0, 2($t1)\nhalt", CpuConfig::default());
    let trap = m.run().unwrap_err();
    assert!(matches!(trap, Trap::Unaligned { offset: 2, .. }));
    assert_eq!(m.state(), State::Halted(Exit::Fault));
}

#[test]
fn unaligned_offset_can_be_reported() {
    let cfg = CpuConfig { halt_on: Conditions::BUS, ..CpuConfig::default() };
    let mut m = machine("lui $t1, 0x1000\nsw $t1, -1($t1)\naddi $t0, $zero, 4\nhalt", cfg);
    let summary = m.run().unwrap();
    assert_eq!(summary.reported.len(), 1);
    assert_eq!(summary.reported[0].condition(), Conditions::UNALIGNED);
    assert_eq!(m.cpu.gpr[8], 4);
    assert_eq!(m.mem.read_word(STATIC_DATA_BASE - 1).unwrap(), 0);
}
