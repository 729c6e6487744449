use mips_sim::asm::build;
use mips_sim::cpu::Step;
use mips_sim::exec::MipsExecutor;
use mips_sim::memory::TEXT_BASE;
use mips_sim::{Bus, Cpu, CpuConfig, Isa, Machine, Mips32Decoder, SparseMemory};

fn enc_i(op: u32, rs: u32, rt: u32, imm: i32) -> u32 {
    (op << 26) | (rs << 21) | (rt << 16) | (imm as u32 & 0xFFFF)
}

fn enc_j(op: u32, address: u32) -> u32 {
    (op << 26) | (address & 0x03FF_FFFF)
}

fn setup(words: &[u32]) -> (Cpu, SparseMemory) {
    let mut mem = SparseMemory::default();
    mem.write_words(TEXT_BASE, words).unwrap();
    (Cpu::new(CpuConfig::default()), mem)
}

#[test]
fn beq_taken_skips_forward() {
    // beq $t0, $t1, +1 ; (skipped) ; target
    let (mut cpu, mut mem) = setup(&[enc_i(0x04, 8, 9, 1)]);
    cpu.gpr[8] = 7;
    cpu.gpr[9] = 7;
    cpu.step(&mut mem, &Mips32Decoder::new(), &MipsExecutor).unwrap();
    assert_eq!(cpu.pc, TEXT_BASE + 2);
}

#[test]
fn beq_not_taken_falls_through() {
    let (mut cpu, mut mem) = setup(&[enc_i(0x04, 8, 9, 5)]);
    cpu.gpr[8] = 1;
    cpu.step(&mut mem, &Mips32Decoder::new(), &MipsExecutor).unwrap();
    assert_eq!(cpu.pc, TEXT_BASE + 1);
}

#[test]
fn bne_backwards_offset_is_relative_to_next_word() {
    let (mut cpu, mut mem) = setup(&[0, enc_i(0x05, 8, 0, -2)]);
    cpu.reset(TEXT_BASE + 1);
    cpu.gpr[8] = 1;
    cpu.step(&mut mem, &Mips32Decoder::new(), &MipsExecutor).unwrap();
    assert_eq!(cpu.pc, TEXT_BASE);
}

#[test]
fn jump_keeps_upper_pc_bits() {
    let (mut cpu, mut mem) = setup(&[enc_j(0x02, TEXT_BASE + 10)]);
    cpu.step(&mut mem, &Mips32Decoder::new(), &MipsExecutor).unwrap();
    assert_eq!(cpu.pc, TEXT_BASE + 10);
}

#[test]
fn halt_does_not_advance() {
    let (mut cpu, mut mem) = setup(&[0xFFFF_FFFF]);
    let step = cpu.step(&mut mem, &Mips32Decoder::new(), &MipsExecutor).unwrap();
    assert_eq!(step, Step::Halted);
    assert_eq!(cpu.pc, TEXT_BASE);
}

#[test]
fn linked_branch_lands_on_its_label() {
    let src = "
        beq $zero, $zero, target
        addi $t0, $zero, 1
        addi $t0, $zero, 2
        target: addi $t1, $zero, 3
        halt
    ";
    let (program, symbols) = build(&Isa::new(), src).unwrap();
    let target = symbols.get("target").unwrap();
    assert_eq!(program.bin[0] & 0xFFFF, target - (TEXT_BASE + 1));

    let mut m = Machine::new(CpuConfig::default());
    m.load(&program).unwrap();
    let mut pcs = Vec::new();
    m.run_with(|f, _| pcs.push(f.pc)).unwrap();
    assert_eq!(pcs, vec![TEXT_BASE, target, target + 1]);
    assert_eq!(m.cpu.gpr[8], 0);
    assert_eq!(m.cpu.gpr[9], 3);
}

#[test]
fn single_stepping_matches_a_full_run() {
    let src = "
        addi $t0, $zero, 4
    again: addi $t1, $t1, 3
        addi $t0, $t0, -1
        bne $t0, $zero, again
        jal done
        halt
    done: jr $ra
    ";
    let (program, _) = build(&Isa::new(), src).unwrap();

    let mut m = Machine::new(CpuConfig::default());
    m.load(&program).unwrap();
    let summary = m.run().unwrap();

    let (mut cpu, mut mem) = setup(&program.bin);
    let mut steps = 0;
    while let Step::Executed(_) = cpu.step(&mut mem, &Mips32Decoder::new(), &MipsExecutor).unwrap() {
        steps += 1;
    }

    assert_eq!(steps, summary.steps);
    assert_eq!(cpu.pc, m.cpu.pc);
    assert_eq!(cpu.gpr, m.cpu.gpr);
}
