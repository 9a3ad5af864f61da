use chrono::{TimeZone, Utc};

use coxswain_core::gym::{Event, Gym, Phase};
use coxswain_core::link::ByteSource;
use coxswain_core::link_mock::MockByteSource;
use coxswain_core::location::NoLocation;
use coxswain_core::models::{Difficulty, Program, Segment};
use coxswain_core::protocol::Protocol;
use coxswain_core::session::Session;
use coxswain_core::storage::Store;
use coxswain_core::storage_memory::MemoryStore;
use coxswain_core::trace::{parse_trace, Directive, StringTrace};

const WATERROWER_TRACE: &str = include_str!("fixtures/waterrower.trace");

fn intervals() -> Program {
    let mut program = Program::meters("500 + 1000", 500, Difficulty::Easy);
    program.add_segment(Segment::new(Difficulty::Medium).with_distance(1000));
    program
}

#[test]
fn captured_session_runs_program_to_the_end() {
    let protocol = Protocol::new(MockByteSource::new(), StringTrace::new()).unwrap();
    let mut session = Session::new(protocol, Gym::new(MemoryStore::new(), NoLocation));
    session.gym_mut().select_program(intervals());

    let mut events = Vec::new();
    let mut frames: i64 = 0;
    for directive in parse_trace(WATERROWER_TRACE).unwrap() {
        let Some(bytes) = directive.input() else {
            continue;
        };
        session.protocol_mut().source_mut().setup_input(bytes);
        while session.protocol().source().available() > 0 {
            let now = Utc.timestamp_opt(1_700_000_000 + frames / 3, 0).unwrap();
            let event = session.tick_at(now).unwrap();
            if event != Event::Acknowledged {
                events.push(event);
            }
            frames += 1;
        }
    }

    assert_eq!(
        events,
        vec![
            Event::ProgramStarted,
            Event::SegmentChanged,
            Event::ProgramFinished
        ]
    );
    assert_eq!(session.gym().phase(), Phase::Finished);

    let gym = session.gym();
    assert_eq!(gym.measurement().distance, 1510);
    assert_eq!(gym.measurement().strokes, 363);

    let workouts = gym.workouts().unwrap();
    assert_eq!(workouts.len(), 1);
    let workout = &workouts[0];
    assert!(workout.distance >= 1500 && workout.distance < 1510);
    assert!(workout.duration > 0);

    let snapshots = gym.snapshots(&workout.id).unwrap();
    assert!(!snapshots.is_empty());
    assert!(snapshots
        .windows(2)
        .all(|pair| pair[0].distance <= pair[1].distance && pair[0].strokes <= pair[1].strokes));
    assert_eq!(snapshots.last().unwrap().distance, workout.distance);

    assert!(session
        .protocol()
        .trace()
        .as_str()
        .starts_with("#protocol 3<FF"));
}

#[test]
fn deleting_workout_leaves_no_snapshots() {
    let source = MockByteSource::with_input(&[0xFE, 0x20, 0xFC, 0xFE, 0x20, 0xFC]);
    let protocol = Protocol::new(source, StringTrace::new()).unwrap();
    let mut session = Session::new(protocol, Gym::new(MemoryStore::new(), NoLocation));
    session
        .gym_mut()
        .select_program(Program::meters("1k", 1000, Difficulty::Easy));

    for _ in 0..4 {
        session.tick().unwrap();
    }

    let workout = session.gym().workout().unwrap().id.clone();
    assert!(!session.gym().snapshots(&workout).unwrap().is_empty());

    session.gym_mut().delete_workout(&workout).unwrap();
    assert!(session.gym().store().list_snapshots(&workout).unwrap().is_empty());
    assert!(session.gym().store().snapshots.is_empty());
}
