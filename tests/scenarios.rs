use std::cell::Cell;

use obfuscated_mem::{bytemuck, Comparison, ObfuscatedCell};

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::NoUninit, bytemuck::CheckedBitPattern)]
struct Record {
    int: i32,
    float: f32,
    letter: char,
    flag: bool,
    _pad: [u8; 3],
}

impl Record {
    fn new(int: i32, flag: bool, float: f32, letter: char) -> Self {
        Self {
            int,
            float,
            letter,
            flag,
            _pad: [0; 3],
        }
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new(1234, true, 123.456, 'Q')
    }
}

impl PartialEq for Record {
    fn eq(&self, rhs: &Self) -> bool {
        self.int == rhs.int
            && self.flag == rhs.flag
            && self.letter == rhs.letter
            && (self.float - rhs.float).abs() < 0.00001
    }
}

/// Runs a dual-callback helper and reports which branch fired.
fn fired<F>(helper: F) -> Option<bool>
where
    F: FnOnce(&dyn Fn(bool)),
{
    let outcome = Cell::new(None);
    helper(&|matched| {
        assert!(outcome.get().is_none(), "more than one branch fired");
        outcome.set(Some(matched));
    });
    outcome.get()
}

#[test]
fn test_integer_get_and_set() {
    let mut cell = ObfuscatedCell::<i32>::new(0).expect("Failed to create cell");
    assert_eq!(cell.get(), 0);

    cell.set(123);
    assert_eq!(cell.get(), 123);
}

#[test]
fn test_integer_single_callback_helpers() {
    let cell = ObfuscatedCell::<i32>::new(123).expect("Failed to create cell");
    let hits = Cell::new(0);
    let hit = |_: i32| hits.set(hits.get() + 1);

    cell.equals(123, hit);
    cell.equals(999, |_| panic!("123 == 999"));
    cell.not_equals(999, hit);
    cell.not_equals(123, |_| panic!("123 != 123"));
    cell.greater_than(100, hit);
    cell.greater_than(200, |_| panic!("123 > 200"));
    cell.greater_or_equal(123, hit);
    cell.greater_or_equal(200, |_| panic!("123 >= 200"));
    cell.less_than(200, hit);
    cell.less_than(100, |_| panic!("123 < 100"));
    cell.less_or_equal(200, hit);
    cell.less_or_equal(100, |_| panic!("123 <= 100"));

    assert_eq!(hits.get(), 6);
}

#[test]
fn test_integer_dual_callback_helpers() {
    let cell = ObfuscatedCell::<i32>::new(123).expect("Failed to create cell");

    let cases: [(i32, [bool; 6]); 3] = [
        (100, [false, true, true, true, false, false]),
        (123, [true, false, false, true, false, true]),
        (200, [false, true, false, false, true, true]),
    ];

    for (rhs, expected) in cases {
        let actual = [
            fired(|f| cell.equals_or_else(rhs, |_| f(true), |_| f(false))),
            fired(|f| cell.not_equals_or_else(rhs, |_| f(true), |_| f(false))),
            fired(|f| cell.greater_than_or_else(rhs, |_| f(true), |_| f(false))),
            fired(|f| cell.greater_or_equal_or_else(rhs, |_| f(true), |_| f(false))),
            fired(|f| cell.less_than_or_else(rhs, |_| f(true), |_| f(false))),
            fired(|f| cell.less_or_equal_or_else(rhs, |_| f(true), |_| f(false))),
        ];

        assert_eq!(actual, expected.map(Some), "comparing 123 against {rhs}");
    }
}

#[test]
fn test_callbacks_receive_current_value() {
    let mut cell = ObfuscatedCell::<i32>::new(0).expect("Failed to create cell");
    cell.set(-7);

    let seen = Cell::new(None);
    cell.less_than_or_else(0, |v| seen.set(Some(v)), |_| {});
    assert_eq!(seen.get(), Some(-7));

    cell.greater_than_or_else(0, |_| {}, |v| seen.set(Some(v * 2)));
    assert_eq!(seen.get(), Some(-14));
}

#[test]
fn test_record_round_trip() {
    let cell = ObfuscatedCell::<Record>::new(Record::default()).expect("Failed to create cell");
    assert_eq!(cell.get(), Record::default());
}

#[test]
fn test_record_equality_branches() {
    let other = Record::new(456, true, 999.999, 'P');
    let cell = ObfuscatedCell::<Record>::new(Record::default()).expect("Failed to create cell");

    let mut matched = false;
    cell.equals(Record::default(), |_| matched = true);
    assert!(matched);

    cell.equals(other, |_| panic!("records must differ"));

    let outcome = fired(|f| cell.equals_or_else(other, |_| f(true), |_| f(false)));
    assert_eq!(outcome, Some(false));

    assert_eq!(
        cell.compare(|v| *v == other),
        Comparison::NotMatched(Record::default())
    );
}

#[test]
fn test_record_overwrite() {
    let other = Record::new(456, false, 999.999, 'P');
    let mut cell = ObfuscatedCell::<Record>::new(Record::default()).expect("Failed to create cell");

    cell.set(other);
    assert_eq!(cell.get(), other);
    assert_eq!(cell.replace(Record::default()), other);
    assert_eq!(cell.get(), Record::default());
}

#[test]
fn test_moved_cells_keep_their_values() {
    let cells = (0..8u64)
        .map(|i| ObfuscatedCell::<u64>::new(i * 1_000_003).expect("Failed to create cell"))
        .collect::<Vec<_>>();
    let offsets = cells.iter().map(ObfuscatedCell::offset).collect::<Vec<_>>();

    let moved = cells.into_iter().map(Box::new).collect::<Vec<_>>();
    for (i, cell) in moved.iter().enumerate() {
        assert_eq!(cell.offset(), offsets[i]);
        assert_eq!(cell.get(), i as u64 * 1_000_003);
    }
}

#[test]
fn test_cell_moves_across_threads() {
    let mut cell = ObfuscatedCell::<u32>::new(7).expect("Failed to create cell");
    cell.set(8);

    let value = std::thread::spawn(move || cell.get())
        .join()
        .expect("Failed to join thread");
    assert_eq!(value, 8);
}
