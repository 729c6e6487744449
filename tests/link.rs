use pretty_assertions::assert_eq;

use mips_sim::asm::{assemble, link, relocate, SymbolTable};
use mips_sim::decoder::{IFields, Instruction, JFields};
use mips_sim::memory::{STATIC_DATA_BASE, TEXT_BASE};
use mips_sim::{Isa, LinkError, Protogram, StaticData, TextStatement};

#[test]
fn symbol_addresses() {
    let src = "
        .data
        a: .word 1, 2
        b: .space 4
        c: .asciiz \"x\"
        .text
        main: halt
        next: halt
    ";
    let proto = assemble(&Isa::new(), src).unwrap();
    let symbols = SymbolTable::build(&proto).unwrap();
    let all: Vec<_> = symbols.iter().collect();
    assert_eq!(
        all,
        vec![
            ("a", STATIC_DATA_BASE),
            ("b", STATIC_DATA_BASE + 2),
            ("c", STATIC_DATA_BASE + 6),
            ("main", TEXT_BASE),
            ("next", TEXT_BASE + 1),
        ]
    );
}

#[test]
fn duplicate_labels_are_rejected() {
    let proto = assemble(&Isa::new(), "x: halt\n.data\nx: .word 0").unwrap();
    assert_eq!(
        SymbolTable::build(&proto),
        Err(LinkError::DuplicateLabel { label: "x".into() })
    );
}

#[test]
fn branch_offset_counts_from_next_word() {
    let src = "
        beq $zero, $zero, fwd
        halt
        halt
        fwd: halt
    ";
    let mut proto = assemble(&Isa::new(), src).unwrap();
    let symbols = SymbolTable::build(&proto).unwrap();
    relocate(&mut proto, &symbols).unwrap();
    let Instruction::Immediate(i) = proto.text[0].instruction else {
        panic!("expected immediate format");
    };
    assert_eq!(i.simm(), 2);
    assert!(proto.is_resolved());
}

#[test]
fn relocating_twice_changes_nothing() {
    let mut proto = assemble(&Isa::new(), "top: j top\nbne $t0, $t1, top").unwrap();
    let symbols = SymbolTable::build(&proto).unwrap();
    relocate(&mut proto, &symbols).unwrap();
    let once = proto.clone();
    relocate(&mut proto, &symbols).unwrap();
    assert_eq!(proto, once);
    assert_eq!(
        proto.text[0].instruction,
        Instruction::Jump(JFields { opcode: 0x02, address: TEXT_BASE })
    );
}

#[test]
fn failed_relocation_leaves_protogram_untouched() {
    let mut proto = assemble(&Isa::new(), "a: j a\nj nowhere").unwrap();
    let before = proto.clone();
    let symbols = SymbolTable::build(&proto).unwrap();
    assert_eq!(
        relocate(&mut proto, &symbols),
        Err(LinkError::UndefinedLabel { label: "nowhere".into() })
    );
    assert_eq!(proto, before);
}

#[test]
fn branch_too_far() {
    let mut symbols = SymbolTable::default();
    symbols.define("far", TEXT_BASE + 0x9000).unwrap();
    let beq = Instruction::Immediate(IFields { opcode: 0x04, rs: 0, rt: 0, imm: 0 });
    let proto = Protogram {
        text: vec![TextStatement::new(beq).with_symbol("far")],
        data: vec![],
    };
    assert_eq!(
        link(proto, &symbols),
        Err(LinkError::BranchOutOfRange { label: "far".into(), offset: 0x8FFF })
    );
}

#[test]
fn memory_offset_label_becomes_byte_offset() {
    let src = ".data\npad: .space 3\nval: .word 77\n.text\nlw $t2, val($t1)";
    let mut proto = assemble(&Isa::new(), src).unwrap();
    let symbols = SymbolTable::build(&proto).unwrap();
    relocate(&mut proto, &symbols).unwrap();
    assert_eq!(
        proto.text[0].instruction,
        Instruction::Immediate(IFields { opcode: 0x23, rs: 9, rt: 10, imm: 12 })
    );
}

#[test]
fn memory_offset_label_out_of_reach() {
    // 0x2000 words in: 0x8000 bytes no longer fits a signed 16-bit offset
    let src = ".data\npad: .space 0x2000\nfar: .word 1\n.text\nlw $t0, far($t1)";
    let proto = assemble(&Isa::new(), src).unwrap();
    let symbols = SymbolTable::build(&proto).unwrap();
    assert_eq!(
        link(proto, &symbols),
        Err(LinkError::OffsetOutOfRange { label: "far".into(), offset: 0x8000 })
    );
}

#[test]
fn link_concatenates_data_in_order() {
    let proto = Protogram {
        text: vec![TextStatement::new(Instruction::Halt)],
        data: vec![
            StaticData { label: "a".into(), words: vec![1] },
            StaticData { label: "b".into(), words: vec![2, 3] },
        ],
    };
    let symbols = SymbolTable::build(&proto).unwrap();
    let program = link(proto, &symbols).unwrap();
    assert_eq!(program.bin, vec![0xFFFF_FFFF]);
    assert_eq!(program.static_data, vec![1, 2, 3]);
}

#[test]
fn program_json_uses_static_data_key() {
    let (program, _) = mips_sim::build(&Isa::new(), ".data\nv: .word 9\n.text\nhalt").unwrap();
    let json = serde_json::to_string(&program).unwrap();
    assert_eq!(json, r#"{"bin":[4294967295],"staticData":[9]}"#);
}
