use pwout::{Parser, Record, Value};

fn parse_flat(text: &str) -> Record {
    Parser::default().parse_flat(text.lines())
}

#[test]
fn simple_one_line_rules() {
    let flat = parse_flat("
        bravais-lattice index     =            0
        lattice parameter (alat)  =       7.1517  a.u.
        unit-cell volume          =     919.5821 (a.u.)^3
    ");
    assert_eq!(flat["lattice parameter"], Value::Float(7.1517));
    assert_eq!(flat["lattice parameter units"].as_str(), Some("a.u."));
    assert_eq!(flat["bravais-lattice index"], Value::Int(0));
    assert_eq!(flat["unit-cell volume"].as_f64(), Some(919.5821));
    assert_eq!(flat["unit-cell volume units"].as_str(), Some("(a.u.)^3"));
}

#[test]
fn label_value_unit_yields_two_entries() {
    let records: Vec<Record> = Parser::default()
        .parse(["     kinetic-energy cutoff     =      30.0000  Ry"])
        .collect();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.len(), 2);
    assert_eq!(record["kinetic-energy cutoff"], Value::Float(30.0));
    assert_eq!(record["kinetic-energy cutoff units"], Value::Text("Ry".to_string()));
}

#[test]
fn integer_and_float_literals_keep_their_type() {
    let flat = parse_flat("
        number of atoms/cell      =            2
        number of electrons       =         8.00
        convergence threshold     =      1.0E-08
        mixing beta               =       0.7000
    ");
    assert_eq!(flat["number of atoms/cell"].kind(), "Int");
    assert_eq!(flat["number of electrons"], Value::Float(8.0));
    assert_eq!(flat["convergence threshold"], Value::Float(1.0e-8));
    assert_eq!(flat["mixing beta"], Value::Float(0.7));
    assert!(!flat.contains_key("number of atoms/cell units"));
}

#[test]
fn fortran_d_exponent() {
    let flat = parse_flat("     smearing width = 0.1D-01 Ry");
    assert_eq!(flat["smearing width"].as_f64(), Some(0.01));
}

#[test]
fn multiple_assignments_on_one_line() {
    let flat = parse_flat("     Total force =     0.011752     Total SCF correction =     0.000072");
    assert_eq!(flat["Total force"].as_f64(), Some(0.011752));
    assert_eq!(flat["Total SCF correction"].as_f64(), Some(0.000072));
    assert_eq!(flat.len(), 2, "no units expected, got {}", flat);
}

#[test]
fn unit_between_assignments_is_attributed_to_the_first_value() {
    let flat = parse_flat("     ecut=    30.00 Ry     beta= 0.70");
    assert_eq!(flat["ecut"].as_f64(), Some(30.0));
    assert_eq!(flat["ecut units"].as_str(), Some("Ry"));
    assert_eq!(flat["beta"].as_f64(), Some(0.7));
}

#[test]
fn inequality_form() {
    let flat = parse_flat("     estimated scf accuracy    <       0.00000033 Ry");
    assert_eq!(flat["estimated scf accuracy"].as_f64(), Some(0.00000033));
    assert_eq!(flat["estimated scf accuracy units"].as_str(), Some("Ry"));
}

#[test]
fn decorative_prefix_is_stripped() {
    let flat = parse_flat("!    total energy              =    -439.62704582 Ry");
    assert_eq!(flat["total energy"].as_f64(), Some(-439.62704582));
    assert_eq!(flat["total energy units"].as_str(), Some("Ry"));
}

#[test]
fn non_numeric_values_are_skipped() {
    let records: Vec<Record> = Parser::default()
        .parse(["     Exchange-correlation= SLA PW PBX PBC", "     = 12.5 eV"])
        .collect();
    assert!(records.is_empty(), "unexpected records: {:?}", records);
}

#[test]
fn later_values_overwrite_earlier_ones() {
    let flat = parse_flat("
     total energy              =    -439.60000000 Ry
     total energy              =    -439.62000000 Ry
!    total energy              =    -439.62704582 Ry
    ");
    assert_eq!(flat["total energy"].as_f64(), Some(-439.62704582));
}

#[test]
fn indexed_labels_stay_distinct() {
    let flat = parse_flat("     celldm(1)=  10.200000  celldm(2)=   0.000000  celldm(3)=   0.000000");
    assert_eq!(flat["celldm(1)"].as_f64(), Some(10.2));
    assert_eq!(flat["celldm(2)"].as_f64(), Some(0.0));
    assert_eq!(flat["celldm(3)"].as_f64(), Some(0.0));
    assert!(!flat.contains_key("celldm"));
    assert_eq!(flat.len(), 3, "got {}", flat);
}

#[test]
fn leading_columns_are_not_part_of_the_label() {
    let flat = parse_flat("
     iteration #  1     ecut=    30.00 Ry     beta= 0.70
     iteration #  2     ecut=    30.00 Ry     beta= 0.70
    ");
    assert_eq!(flat["ecut"].as_f64(), Some(30.0));
    assert_eq!(flat["ecut units"].as_str(), Some("Ry"));
    assert_eq!(flat["beta"].as_f64(), Some(0.7));
    assert_eq!(flat.len(), 3, "got {}", flat);
}
