use romset_core::{Machine, MachineRom, MachineType, Rom, RomType};
use romset_db::*;

/// Parent puckman (A, B), clone pacman (B' merging B), BIOS board, device
/// chip. CRCs are stored uppercase.
fn seeded() -> Connection {
    let conn = open_memory().unwrap();
    insert_header(&conn, Some("0.270 (mame0270)"), Some("no"), Some("10")).unwrap();

    let machines = vec![
        Machine {
            machine_id: 1,
            name: "puckman".to_string(),
            description: Some("PuckMan (Japan set 1)".to_string()),
            year: Some("1980".to_string()),
            manufacturer: Some("Namco".to_string()),
            romof: None,
            cloneof: None,
            machine_type: MachineType::Regular,
        },
        Machine {
            machine_id: 2,
            name: "pacman".to_string(),
            description: Some("Pac-Man (Midway)".to_string()),
            year: Some("1980".to_string()),
            manufacturer: Some("Midway".to_string()),
            romof: Some("puckman".to_string()),
            cloneof: Some("puckman".to_string()),
            machine_type: MachineType::Regular,
        },
        Machine {
            machine_id: 3,
            name: "neogeo".to_string(),
            description: Some("Neo-Geo MV-6".to_string()),
            year: Some("1990".to_string()),
            manufacturer: Some("SNK".to_string()),
            romof: None,
            cloneof: None,
            machine_type: MachineType::Bios,
        },
        Machine {
            machine_id: 4,
            name: "namco51".to_string(),
            description: Some("Namco 51xx".to_string()),
            year: None,
            manufacturer: None,
            romof: None,
            cloneof: None,
            machine_type: MachineType::Device,
        },
    ];
    insert_machines(&conn, &machines).unwrap();

    let roms = vec![
        Rom {
            rom_id: 1,
            name: "a".to_string(),
            size: 2048,
            crc: "1111".to_string(),
            rom_type: RomType::Regular,
        },
        Rom {
            rom_id: 2,
            name: "b".to_string(),
            size: 2048,
            crc: "2222".to_string(),
            rom_type: RomType::Regular,
        },
        Rom {
            rom_id: 3,
            name: "bprime".to_string(),
            size: 2048,
            crc: "2233".to_string(),
            rom_type: RomType::Regular,
        },
        Rom {
            rom_id: 4,
            name: "neo-bios".to_string(),
            size: 131072,
            crc: "ABCD".to_string(),
            rom_type: RomType::Bios,
        },
        Rom {
            rom_id: 5,
            name: "51xx.bin".to_string(),
            size: 1024,
            crc: "9999".to_string(),
            rom_type: RomType::Device,
        },
    ];
    insert_roms(&conn, &roms).unwrap();

    let edges = vec![
        MachineRom {
            machine_id: 1,
            rom_id: 1,
            merge: None,
        },
        MachineRom {
            machine_id: 1,
            rom_id: 2,
            merge: None,
        },
        MachineRom {
            machine_id: 2,
            rom_id: 3,
            merge: Some("b".to_string()),
        },
        MachineRom {
            machine_id: 3,
            rom_id: 4,
            merge: None,
        },
        MachineRom {
            machine_id: 4,
            rom_id: 5,
            merge: None,
        },
    ];
    insert_edges(&conn, &edges).unwrap();
    conn
}

#[test]
fn catalog_version_reads_build_string() {
    let conn = seeded();
    assert_eq!(catalog_version(&conn).unwrap(), "0.270 (mame0270)");
}

#[test]
fn catalog_version_without_header_is_not_found() {
    let conn = open_memory().unwrap();
    assert!(matches!(
        catalog_version(&conn),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn list_machines_is_ordered_by_name() {
    let conn = seeded();
    let machines = list_machines(&conn).unwrap();
    let names: Vec<&str> = machines.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["namco51", "neogeo", "pacman", "puckman"]);
    assert_eq!(machines[0].machine_type, MachineType::Device);
    assert_eq!(machines[1].machine_type, MachineType::Bios);
}

#[test]
fn machine_summary_by_name() {
    let conn = seeded();
    let summary = machine_summary(&conn, "pacman").unwrap().unwrap();
    assert_eq!(summary.machine_id, 2);
    assert_eq!(summary.cloneof.as_deref(), Some("puckman"));
    assert!(machine_summary(&conn, "missing").unwrap().is_none());
}

#[test]
fn machine_name_by_id() {
    let conn = seeded();
    assert_eq!(machine_name(&conn, 1).unwrap().as_deref(), Some("puckman"));
    assert_eq!(machine_name(&conn, 99).unwrap(), None);
}

#[test]
fn clones_of_lists_children() {
    let conn = seeded();
    let clones = clones_of(&conn, "puckman").unwrap();
    assert_eq!(clones.len(), 1);
    assert_eq!(clones[0].name, "pacman");
    assert!(clones_of(&conn, "pacman").unwrap().is_empty());
}

#[test]
fn search_matches_name_and_description() {
    let conn = seeded();
    let by_name = search_machines(&conn, "man").unwrap();
    assert_eq!(by_name.len(), 2);
    let by_description = search_machines(&conn, "Midway").unwrap();
    assert_eq!(by_description.len(), 1);
    assert_eq!(by_description[0].name, "pacman");
}

#[test]
fn find_machine_by_crcs_exact_match() {
    let conn = seeded();
    assert_eq!(
        find_machine_by_crcs(&conn, &["1111", "2222"]).unwrap(),
        Some(1)
    );
    assert_eq!(find_machine_by_crcs(&conn, &["2233"]).unwrap(), Some(2));
    assert_eq!(find_machine_by_crcs(&conn, &["dead"]).unwrap(), None);
}

#[test]
fn find_machine_by_crcs_is_case_insensitive() {
    let conn = seeded();
    assert_eq!(find_machine_by_crcs(&conn, &["abcd"]).unwrap(), Some(3));
}

#[test]
fn find_machine_by_crcs_requires_full_coverage() {
    let conn = seeded();
    // One CRC from puckman, one unknown: no machine matches both.
    assert_eq!(find_machine_by_crcs(&conn, &["1111", "dead"]).unwrap(), None);
    // A single known CRC still matches the machine holding it.
    assert_eq!(find_machine_by_crcs(&conn, &["1111"]).unwrap(), Some(1));
}

#[test]
fn find_machine_by_crcs_dedups_input() {
    let conn = seeded();
    assert_eq!(
        find_machine_by_crcs(&conn, &["1111", "1111", "2222"]).unwrap(),
        Some(1)
    );
    let empty: &[&str] = &[];
    assert_eq!(find_machine_by_crcs(&conn, empty).unwrap(), None);
}

#[test]
fn catalog_stats_counts_rows() {
    let conn = seeded();
    let stats = catalog_stats(&conn).unwrap();
    assert_eq!(stats.machines, 4);
    assert_eq!(stats.bios_machines, 1);
    assert_eq!(stats.device_machines, 1);
    assert_eq!(stats.roms, 5);
    assert_eq!(stats.edges, 5);
}
