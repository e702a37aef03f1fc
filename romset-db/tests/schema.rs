use romset_db::*;

#[test]
fn creates_all_four_tables() {
    let conn = open_memory().unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' \
             AND name IN ('mame', 'machine', 'rom', 'machine_rom')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 4);
}

#[test]
fn create_schema_is_idempotent() {
    let conn = open_memory().unwrap();
    create_schema(&conn).unwrap();
    create_schema(&conn).unwrap();
}

#[test]
fn rom_identity_triple_is_unique() {
    let conn = open_memory().unwrap();
    conn.execute(
        "INSERT INTO rom (rom_id, name, size, crc) VALUES (1, 'a', 16, 'AAAA')",
        [],
    )
    .unwrap();
    let dup = conn.execute(
        "INSERT INTO rom (rom_id, name, size, crc) VALUES (2, 'a', 16, 'AAAA')",
        [],
    );
    assert!(dup.is_err());

    // Same name with a different size is a different ROM.
    conn.execute(
        "INSERT INTO rom (rom_id, name, size, crc) VALUES (3, 'a', 32, 'AAAA')",
        [],
    )
    .unwrap();
}

#[test]
fn machine_name_is_unique() {
    let conn = open_memory().unwrap();
    conn.execute(
        "INSERT INTO machine (machine_id, name) VALUES (1, 'puckman')",
        [],
    )
    .unwrap();
    let dup = conn.execute(
        "INSERT INTO machine (machine_id, name) VALUES (2, 'puckman')",
        [],
    );
    assert!(dup.is_err());
}

#[test]
fn machine_rom_pair_is_unique() {
    let conn = open_memory().unwrap();
    conn.execute(
        "INSERT INTO machine (machine_id, name) VALUES (1, 'm')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO rom (rom_id, name, size, crc) VALUES (1, 'a', 16, 'AAAA')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO machine_rom (machine_id, rom_id) VALUES (1, 1)",
        [],
    )
    .unwrap();
    let dup = conn.execute(
        "INSERT INTO machine_rom (machine_id, rom_id) VALUES (1, 1)",
        [],
    );
    assert!(dup.is_err());
}
