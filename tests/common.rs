#![cfg(feature = "std")]

use std::{fs::File, io::BufReader, path::Path};

use csv::ReaderBuilder;
use shotread::{
    record::{RecordShape, ResultType, SampleFormat},
    shots::{FromShot, FromShots},
};
use tinyvec::ArrayVec;

const EXPECTED: &str = "fixtures/shots.csv";

/// Fixture records hold six measurements, three detectors and an observable.
const TAGGED: RecordShape = RecordShape {
    measurements: 6,
    detectors: 3,
    observables: 1,
};

/// The same records without categories.
const UNTAGGED: RecordShape = RecordShape {
    measurements: 10,
    detectors: 0,
    observables: 0,
};

#[test]
fn decode_slice_01() {
    const PATH: &str = "fixtures/shots.01";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(EXPECTED, false);
    let n = shotread::shots::decode_slice(&data, SampleFormat::Format01, UNTAGGED, &mut validator)
        .unwrap();
    validator.finish(n);
}

#[test]
fn decode_slice_b8() {
    const PATH: &str = "fixtures/shots.b8";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(EXPECTED, false);
    let n = shotread::shots::decode_slice(&data, SampleFormat::B8, UNTAGGED, &mut validator)
        .unwrap();
    validator.finish(n);
}

#[test]
fn decode_slice_hits() {
    const PATH: &str = "fixtures/shots.hits";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(EXPECTED, false);
    let n = shotread::shots::decode_slice(&data, SampleFormat::Hits, UNTAGGED, &mut validator)
        .unwrap();
    validator.finish(n);
}

#[test]
fn decode_slice_r8() {
    const PATH: &str = "fixtures/shots.r8";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(EXPECTED, false);
    let n = shotread::shots::decode_slice(&data, SampleFormat::R8, UNTAGGED, &mut validator)
        .unwrap();
    validator.finish(n);
}

#[test]
fn decode_slice_dets() {
    const PATH: &str = "fixtures/shots.dets";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(EXPECTED, true);
    let n = shotread::shots::decode_slice(&data, SampleFormat::Dets, TAGGED, &mut validator)
        .unwrap();
    validator.finish(n);
}

#[test]
fn decode_reader_01() {
    const PATH: &str = "fixtures/shots.01";
    let mut file = BufReader::new(File::open(PATH).unwrap());
    let mut validator = Validator::new(EXPECTED, false);
    let n =
        shotread::shots::decode_reader(&mut file, SampleFormat::Format01, UNTAGGED, &mut validator)
            .unwrap();
    validator.finish(n);
}

#[test]
fn decode_reader_r8() {
    const PATH: &str = "fixtures/shots.r8";
    let mut file = BufReader::new(File::open(PATH).unwrap());
    let mut validator = Validator::new(EXPECTED, false);
    let n = shotread::shots::decode_reader(&mut file, SampleFormat::R8, UNTAGGED, &mut validator)
        .unwrap();
    validator.finish(n);
}

#[test]
fn decode_reader_dets() {
    const PATH: &str = "fixtures/shots.dets";
    let mut file = BufReader::new(File::open(PATH).unwrap());
    let mut validator = Validator::new(EXPECTED, true);
    let n = shotread::shots::decode_reader(&mut file, SampleFormat::Dets, TAGGED, &mut validator)
        .unwrap();
    validator.finish(n);
}

/// Compares received shots against the bits listed in a CSV file.
struct Validator(Vec<Vec<(char, bool)>>, Vec<Shot>);

/// Bits received for one shot, with their category tags.
#[derive(Default)]
struct Shot(ArrayVec<[(char, bool); 16]>);

impl Validator {
    fn new(path: impl AsRef<Path>, tagged: bool) -> Self {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();

        let expected = reader
            .records()
            .map(|r| {
                let r = r.unwrap();
                r.iter()
                    .zip(['M', 'D', 'L'])
                    .flat_map(|(bits, tag)| {
                        let tag = if tagged { tag } else { 'M' };
                        bits.chars().map(move |c| (tag, c == '1'))
                    })
                    .collect()
            })
            .collect();

        Self(expected, Vec::new())
    }

    fn finish(self, n: usize) {
        assert_eq!(n, self.0.len());
        let received: Vec<Vec<(char, bool)>> = self.1.iter().map(|s| s.0.to_vec()).collect();
        assert_eq!(received, self.0);
    }
}

impl FromShots for Validator {
    fn add_shot(&mut self, index: usize) -> Option<&mut dyn FromShot> {
        assert_eq!(index, self.1.len());
        self.1.push(Shot::default());
        self.1.last_mut().map(|s| s as &mut dyn FromShot)
    }
}

impl FromShot for Shot {
    fn add_bit(&mut self, result_type: ResultType, position: usize, bit: bool) {
        assert_eq!(position, self.0.len());
        self.0.push((char::from(result_type), bit));
    }
}
