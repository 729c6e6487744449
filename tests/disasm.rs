use mips_sim::asm::assemble;
use mips_sim::decoder::Decoder;
use mips_sim::disasm::{fmt_instruction, fmt_with_operand};
use mips_sim::{Isa, Mips32Decoder};

#[test]
fn disassembly_reparses_to_the_same_word() {
    let isa = Isa::new();
    let dec = Mips32Decoder::new();
    let src = "
        add $t0, $t1, $t2
        sll $s0, $t0, 3
        jr $ra
        addi $sp, $sp, -8
        ori $t0, $t0, 65535
        lui $at, 4096
        beq $a0, $a1, -3
        lw $t0, -4($sp)
        j 0x400010
        halt
    ";
    let proto = assemble(&isa, src).unwrap();
    for stmt in &proto.text {
        let word = stmt.instruction.encode();
        let text = fmt_instruction(&isa, &dec.decode(word));
        let again = assemble(&isa, &text).unwrap();
        assert_eq!(again.text[0].instruction.encode(), word, "{text}");
    }
}

#[test]
fn formats() {
    let isa = Isa::new();
    let dec = Mips32Decoder::new();
    assert_eq!(fmt_instruction(&isa, &dec.decode(0x012A_4020)), "add $t0, $t1, $t2");
    assert_eq!(fmt_instruction(&isa, &dec.decode(0x8D28_0004)), "lw $t0, 4($t1)");
    assert_eq!(fmt_instruction(&isa, &dec.decode(0x0810_0000)), "j 0x100000");
    assert_eq!(fmt_instruction(&isa, &dec.decode(0xFFFF_FFFF)), "halt");
    // mfhi is not in the subset
    assert_eq!(fmt_instruction(&isa, &dec.decode(0x0000_4010)), ".word 0x00004010");
}

#[test]
fn unresolved_operands_print_their_label() {
    let isa = Isa::new();
    let proto = assemble(&isa, "loop: bne $t0, $zero, loop").unwrap();
    let stmt = &proto.text[0];
    assert_eq!(
        fmt_with_operand(&isa, &stmt.instruction, stmt.symbol.as_deref()),
        "bne $t0, $zero, loop"
    );
}
