//! Integration tests for instruction-stream decoding and iteration.

use cilbody::{
    disassembler::{decode_at, FlowType, Operand},
    Error, MethodBody, Token,
};

/// Wraps code bytes in a tiny header and parses the body.
fn body_over(code: &[u8]) -> MethodBody {
    assert!(code.len() < 64, "tiny header limit");
    let mut blob = vec![((code.len() as u8) << 2) | 0b10];
    blob.extend_from_slice(code);
    MethodBody::parse(&blob, 0).unwrap()
}

#[test]
fn size_conservation() {
    // A stream exercising every operand width: none, i8, i32, i64, f32, f64,
    // token, switch, and a two-byte opcode.
    let code: Vec<u8> = [
        &[0x00][..],                                          // nop
        &[0x1F, 0x05],                                        // ldc.i4.s 5
        &[0x20, 0x01, 0x00, 0x00, 0x00],                      // ldc.i4 1
        &[0x21, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ldc.i8 1
        &[0x22, 0x00, 0x00, 0xC0, 0x3F],                      // ldc.r4 1.5
        &[0x23, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF8, 0x3F], // ldc.r8 1.5
        &[0x72, 0x01, 0x00, 0x00, 0x70],                      // ldstr
        &[0x45, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // switch (1 case)
        &[0xFE, 0x01],                                        // ceq
        &[0x2A],                                              // ret
    ]
    .concat();

    let body = body_over(&code);
    let mut il = body.instructions();

    let mut decoded = 0usize;
    let mut previous_end = 0usize;
    while il.move_next().unwrap() {
        assert_eq!(
            il.index(),
            previous_end,
            "instructions must tile the code region without gaps or overlaps"
        );
        previous_end = il.next_index();
        decoded += 1;
    }

    assert_eq!(previous_end, code.len());
    assert_eq!(decoded, 10);
}

#[test]
fn switch_sizing() {
    // switch with 3 targets: 1 opcode byte + 4 count bytes + 12 target bytes
    let code = [
        0x45, 0x03, 0x00, 0x00, 0x00, //
        0x02, 0x00, 0x00, 0x00, //
        0x05, 0x00, 0x00, 0x00, //
        0xF8, 0xFF, 0xFF, 0xFF, //
    ];

    let body = body_over(&code);
    let mut il = body.instructions();

    assert!(il.move_next().unwrap());
    assert_eq!(il.mnemonic(), "switch");
    assert_eq!(il.next_index() - il.index(), 17);
    assert_eq!(il.switch_targets(), Some(&[2, 5, -8][..]));
    assert_eq!(il.flow_type(), FlowType::Switch);

    // Displacements are relative to the end of the instruction
    assert_eq!(il.instruction().branch_targets[0], 19);
    assert_eq!(il.instruction().branch_targets[1], 22);
    assert_eq!(il.instruction().branch_targets[2], 9);

    assert!(!il.move_next().unwrap());
}

#[test]
fn determinism_across_iterators() {
    let code = [
        0x00, // nop
        0x2C, 0x05, // brfalse.s 5
        0x00, // nop
        0x2B, 0x03, // br.s 3
        0x00, // nop
        0x2A, // ret
        0x00, // nop
        0x2A, // ret
    ];

    let body = body_over(&code);

    let walk = |body: &MethodBody| {
        let mut il = body.instructions();
        let mut seen = Vec::new();
        while il.move_next().unwrap() {
            seen.push((il.index(), il.mnemonic(), il.flow_type()));
        }
        seen
    };

    let first = walk(&body);
    let second = walk(&body);

    assert_eq!(first.len(), 8);
    assert_eq!(first, second);
}

#[test]
fn truncated_branch_operand() {
    // br wants 4 displacement bytes, the region only holds 2
    let code = [0x00, 0x38, 0x01, 0x02];
    let body = body_over(&code);

    let mut il = body.instructions();
    assert!(il.move_next().unwrap());

    let result = il.move_next();
    assert!(matches!(result, Err(Error::TruncatedOperand { offset: 1 })));
}

#[test]
fn truncated_switch_count() {
    // switch opcode with only 2 of 4 count bytes
    let code = [0x45, 0x01, 0x00];
    let body = body_over(&code);

    let mut il = body.instructions();
    let result = il.move_next();
    assert!(matches!(result, Err(Error::TruncatedOperand { offset: 0 })));
}

#[test]
fn unknown_opcode_offset() {
    let code = [0x00, 0x00, 0xBB];
    let body = body_over(&code);

    let mut il = body.instructions();
    assert!(il.move_next().unwrap());
    assert!(il.move_next().unwrap());

    let result = il.move_next();
    assert!(matches!(
        result,
        Err(Error::UnknownOpcode {
            offset: 2,
            prefix: 0,
            opcode: 0xBB
        })
    ));
}

#[test]
fn tokens_pass_through_uninterpreted() {
    // call 0x0A00000F, ldstr 0x70000001
    let code = [
        0x28, 0x0F, 0x00, 0x00, 0x0A, //
        0x72, 0x01, 0x00, 0x00, 0x70, //
        0x2A,
    ];

    let body = body_over(&code);
    let mut il = body.instructions();

    assert!(il.move_next().unwrap());
    assert_eq!(il.mnemonic(), "call");
    assert_eq!(il.flow_type(), FlowType::Call);
    assert_eq!(il.operand(), &Operand::Token(Token::new(0x0A00_000F)));

    assert!(il.move_next().unwrap());
    assert_eq!(il.mnemonic(), "ldstr");
    assert_eq!(il.instruction().token(), Some(Token::new(0x7000_0001)));
}

#[test]
fn branch_displacements_as_signed_values() {
    let code = [
        0x00, // nop
        0x00, // nop
        0x2B, 0xFC, // br.s -4
        0x38, 0x0A, 0x00, 0x00, 0x00, // br 10
        0x2A, // ret
    ];

    let body = body_over(&code);
    let mut il = body.instructions();

    assert!(il.move_next().unwrap());
    assert!(il.move_next().unwrap());

    assert!(il.move_next().unwrap());
    assert_eq!(il.mnemonic(), "br.s");
    assert_eq!(il.operand_value(), Some(-4));
    assert_eq!(il.instruction().branch_targets[0], 0);

    assert!(il.move_next().unwrap());
    assert_eq!(il.mnemonic(), "br");
    assert_eq!(il.operand_value(), Some(10));
    assert_eq!(il.instruction().branch_targets[0], 19);
}

#[test]
fn sub_range_over_protected_block() {
    // nop | nop, leave.s +0 | ret: iterate only the middle region
    let code = [0x00, 0x00, 0xDE, 0x00, 0x2A];
    let body = body_over(&code);

    let mut il = body.instructions_in(1, 4).unwrap();
    let mut mnemonics = Vec::new();
    while il.move_next().unwrap() {
        mnemonics.push(il.mnemonic());
    }

    assert_eq!(mnemonics, vec!["nop", "leave.s"]);
}

#[test]
fn random_access_decoding_matches_iteration() {
    let code = [0x00, 0x1F, 0x07, 0xFE, 0x01, 0x2A];
    let body = body_over(&code);

    let mut il = body.instructions();
    while il.move_next().unwrap() {
        let probed = decode_at(body.code(), il.index()).unwrap();
        assert_eq!(&probed, il.instruction());
    }
}
