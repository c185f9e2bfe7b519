use crate::catalogue::{Seat, SeatCatalogue, SectionInfo};
use crate::section::{SeatPosition, SectionSpec};
use marquee_shared::SeatId;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Section '{section}' has invalid dimensions: {rows} rows x {columns} columns")]
    InvalidDimensions {
        section: String,
        rows: u32,
        columns: u32,
    },

    #[error("Duplicate section name: {0}")]
    DuplicateSection(String),

    #[error("Removed seat out of bounds in section '{section}': row {row}, column {column}")]
    RemovedOutOfBounds {
        section: String,
        row: u32,
        column: u32,
    },
}

/// Spreadsheet-style row labels: 0 -> "A", 25 -> "Z", 26 -> "AA".
fn row_label(index: u32) -> String {
    let mut n = index + 1;
    let mut label = Vec::new();
    while n > 0 {
        n -= 1;
        label.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    label.reverse();
    // Always ASCII uppercase by construction.
    String::from_utf8(label).unwrap_or_default()
}

/// Generate the immutable seat catalogue for a venue layout.
///
/// Deterministic and order-stable: sections in input order, rows front to
/// back, columns left to right. Removed positions are skipped outright so
/// they never enter the bookable id space. Identical input yields an
/// identical catalogue, which is what lets an edited layout be diffed
/// against existing show status tables.
pub fn generate(sections: &[SectionSpec]) -> Result<SeatCatalogue, LayoutError> {
    let mut seen_names = HashSet::new();
    let mut seats = Vec::new();
    let mut infos = Vec::new();

    for spec in sections {
        if spec.rows == 0 || spec.columns == 0 {
            return Err(LayoutError::InvalidDimensions {
                section: spec.name.clone(),
                rows: spec.rows,
                columns: spec.columns,
            });
        }
        if !seen_names.insert(spec.name.clone()) {
            return Err(LayoutError::DuplicateSection(spec.name.clone()));
        }

        let mut removed = HashSet::new();
        for pos in &spec.removed {
            if pos.row == 0 || pos.row > spec.rows || pos.column == 0 || pos.column > spec.columns {
                return Err(LayoutError::RemovedOutOfBounds {
                    section: spec.name.clone(),
                    row: pos.row,
                    column: pos.column,
                });
            }
            removed.insert((pos.row, pos.column));
        }

        for row in 0..spec.rows {
            let label = row_label(row);
            for column in 1..=spec.columns {
                if removed.contains(&(row + 1, column)) {
                    continue;
                }
                seats.push(Seat {
                    id: SeatId::new(&spec.name, &label, column),
                    section: spec.name.clone(),
                    row_label: label.clone(),
                    column,
                    price: spec.base_price,
                });
            }
        }

        infos.push(SectionInfo {
            name: spec.name.clone(),
            rows: spec.rows,
            columns: spec.columns,
            gaps: spec.gaps.clone(),
        });
    }

    Ok(SeatCatalogue::new(seats, infos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::GapMarker;

    #[test]
    fn test_generate_basic_catalogue() {
        // 1 section, 2 rows, 3 columns, base price 100.
        let catalogue = generate(&[SectionSpec::new("Standard", 100, 2, 3)]).unwrap();

        let ids: Vec<String> = catalogue.seat_ids().map(|id| id.to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "Standard-A-1",
                "Standard-A-2",
                "Standard-A-3",
                "Standard-B-1",
                "Standard-B-2",
                "Standard-B-3",
            ]
        );
        assert!(catalogue.iter().all(|s| s.price == 100));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let spec = vec![
            SectionSpec::new("Platinum", 25000, 3, 8).with_removed(vec![SeatPosition {
                row: 2,
                column: 4,
            }]),
            SectionSpec::new("Gold", 18000, 5, 10),
        ];

        let first = generate(&spec).unwrap();
        let second = generate(&spec).unwrap();

        let first_ids: Vec<_> = first.seat_ids().cloned().collect();
        let second_ids: Vec<_> = second.seat_ids().cloned().collect();
        assert_eq!(first_ids, second_ids);

        for id in &first_ids {
            assert_eq!(first.get(id).unwrap().price, second.get(id).unwrap().price);
        }
    }

    #[test]
    fn test_removed_seats_never_appear() {
        let catalogue = generate(&[SectionSpec::new("Gold", 150, 2, 2).with_removed(vec![
            SeatPosition { row: 1, column: 2 },
        ])])
        .unwrap();

        assert_eq!(catalogue.len(), 3);
        assert!(!catalogue.contains(&SeatId::from("Gold-A-2")));
        assert!(catalogue.contains(&SeatId::from("Gold-A-1")));
    }

    #[test]
    fn test_gaps_do_not_change_identity_space() {
        let plain = generate(&[SectionSpec::new("Gold", 150, 2, 3)]).unwrap();
        let gapped = generate(&[
            SectionSpec::new("Gold", 150, 2, 3).with_gaps(vec![GapMarker::Column(1)])
        ])
        .unwrap();

        let a: Vec<_> = plain.seat_ids().cloned().collect();
        let b: Vec<_> = gapped.seat_ids().cloned().collect();
        assert_eq!(a, b);
        assert_eq!(gapped.sections()[0].gaps, vec![GapMarker::Column(1)]);
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(matches!(
            generate(&[SectionSpec::new("Gold", 100, 0, 5)]),
            Err(LayoutError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            generate(&[SectionSpec::new("Gold", 100, 5, 0)]),
            Err(LayoutError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_section() {
        let specs = vec![
            SectionSpec::new("Gold", 100, 1, 1),
            SectionSpec::new("Gold", 200, 1, 1),
        ];
        assert!(matches!(
            generate(&specs),
            Err(LayoutError::DuplicateSection(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_bounds_removal() {
        let specs = vec![SectionSpec::new("Gold", 100, 2, 2).with_removed(vec![SeatPosition {
            row: 3,
            column: 1,
        }])];
        assert!(matches!(
            generate(&specs),
            Err(LayoutError::RemovedOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_row_labels_extend_past_z() {
        assert_eq!(row_label(0), "A");
        assert_eq!(row_label(25), "Z");
        assert_eq!(row_label(26), "AA");
        assert_eq!(row_label(27), "AB");
        assert_eq!(row_label(51), "AZ");
        assert_eq!(row_label(52), "BA");
    }

    #[test]
    fn test_total_price() {
        let catalogue = generate(&[
            SectionSpec::new("Gold", 150, 1, 2),
            SectionSpec::new("Silver", 90, 1, 1),
        ])
        .unwrap();

        let ids = [
            SeatId::from("Gold-A-1"),
            SeatId::from("Gold-A-2"),
            SeatId::from("Silver-A-1"),
        ];
        assert_eq!(catalogue.total_price(ids.iter()), Some(390));
        assert_eq!(
            catalogue.total_price([SeatId::from("Gold-Z-9")].iter()),
            None
        );
    }
}
