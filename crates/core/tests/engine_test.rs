use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use fieldbook_core::{
    calendar::{TimeSlot, WeekDay},
    engine::{
        conflict::{conflicting_appointments, has_conflict, CandidateWindow},
        deadline::{cutoff, is_bookable},
        packer::{fits, required_slot_span, structural_starts},
        resolver::{effective_slots, SlotOrigin},
        BookingPolicy,
    },
    errors::SlotError,
    models::{
        booking::{
            AppointmentStatus, BookedWindow, CandidateBooking, EditContext, PooledSlot,
            TechnicianSelector,
        },
        schedule::{DateOverride, WeeklyTemplate},
        service::ServiceSpec,
    },
    AvailabilityEngine, AvailabilityInputs,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;

use TimeSlot::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(day: NaiveDate, h: u32, m: u32, s: u32) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_opt(h, m, s).unwrap())
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Monday 2 June 2025.
fn monday() -> NaiveDate {
    date(2025, 6, 2)
}

/// The Friday before, early enough for every Monday slot.
fn well_before() -> NaiveDateTime {
    at(date(2025, 5, 30), 8, 0, 0)
}

fn service(minutes: u32) -> ServiceSpec {
    ServiceSpec::new(minutes, "repair")
}

fn full_week(slots: &[TimeSlot]) -> WeeklyTemplate {
    [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
    ]
    .into_iter()
    .fold(WeeklyTemplate::new(), |t, day| t.with_day(day, slots.iter().copied()))
}

fn window(day: NaiveDate, start: NaiveTime, end: NaiveTime) -> BookedWindow {
    BookedWindow {
        technician_id: Uuid::new_v4(),
        date: day,
        start_time: start,
        end_time: end,
        appointment_id: Uuid::new_v4(),
        status: AppointmentStatus::Scheduled,
    }
}

// Schedule resolver

#[rstest]
#[case(date(2025, 6, 2), vec![NineAM, ElevenAM, OnePM])]
#[case(date(2025, 6, 3), vec![ThreePM])]
#[case(date(2025, 6, 4), vec![])]
#[case(date(2025, 6, 7), vec![])]
#[case(date(2025, 6, 8), vec![])]
fn test_template_applies_without_override(#[case] day: NaiveDate, #[case] expected: Vec<TimeSlot>) {
    let technician_id = Uuid::new_v4();
    let template = WeeklyTemplate::new()
        .with_day(WeekDay::Monday, [OnePM, NineAM, ElevenAM])
        .with_day(WeekDay::Tuesday, [ThreePM]);

    let resolved = effective_slots(technician_id, day, Some(&template), None);

    assert_eq!(resolved.slots.into_iter().collect::<Vec<_>>(), expected);
    assert!(resolved.warning.is_none());
}

#[test]
fn test_weekend_is_empty_even_with_full_template() {
    let template = full_week(&TimeSlot::ALL);
    let resolved = effective_slots(Uuid::new_v4(), date(2025, 6, 7), Some(&template), None);

    assert!(resolved.slots.is_empty());
    assert_eq!(resolved.origin, SlotOrigin::NoSchedule);
}

#[test]
fn test_override_replaces_template() {
    let technician_id = Uuid::new_v4();
    let template = full_week(&[NineAM, ElevenAM]);
    let date_override = DateOverride::new(technician_id, monday(), [FivePM]);

    let resolved = effective_slots(technician_id, monday(), Some(&template), Some(&date_override));

    assert_eq!(resolved.slots.into_iter().collect::<Vec<_>>(), vec![FivePM]);
    assert_eq!(resolved.origin, SlotOrigin::DateOverride);
}

#[test]
fn test_empty_override_means_day_off() {
    let technician_id = Uuid::new_v4();
    let template = full_week(&TimeSlot::ALL);
    let date_override = DateOverride::day_off(technician_id, monday());

    let resolved = effective_slots(technician_id, monday(), Some(&template), Some(&date_override));

    assert!(resolved.slots.is_empty());
    assert_eq!(resolved.origin, SlotOrigin::DateOverride);
}

#[test]
fn test_override_for_other_date_is_ignored() {
    let technician_id = Uuid::new_v4();
    let template = full_week(&[NineAM]);
    let date_override = DateOverride::day_off(technician_id, date(2025, 6, 3));

    let resolved = effective_slots(technician_id, monday(), Some(&template), Some(&date_override));

    assert_eq!(resolved.slots.into_iter().collect::<Vec<_>>(), vec![NineAM]);
    assert_eq!(resolved.origin, SlotOrigin::WeeklyTemplate);
}

#[test]
fn test_malformed_override_is_normalized_and_reported() {
    let technician_id = Uuid::new_v4();
    let date_override = DateOverride::new(technician_id, monday(), [ThreePM, NineAM, ThreePM]);

    let resolved = effective_slots(technician_id, monday(), None, Some(&date_override));

    assert_eq!(resolved.slots.into_iter().collect::<Vec<_>>(), vec![NineAM, ThreePM]);
    match resolved.warning {
        Some(SlotError::InvalidOverrideState { detail, .. }) => assert!(detail.contains("duplicate")),
        other => panic!("expected InvalidOverrideState, got {:?}", other),
    }
}

// Duration packer

#[rstest]
#[case(0, 1)]
#[case(60, 1)]
#[case(120, 1)]
#[case(121, 2)]
#[case(180, 2)]
#[case(240, 2)]
#[case(241, 3)]
#[case(600, 5)]
#[case(1440, 5)]
fn test_required_slot_span(#[case] minutes: u32, #[case] span: usize) {
    assert_eq!(required_slot_span(&service(minutes)), span);
}

#[test]
fn test_required_slot_span_is_monotonic() {
    let mut previous = 0;
    for minutes in 0..=900 {
        let span = required_slot_span(&service(minutes));
        assert!(span >= previous, "span dropped at {} minutes", minutes);
        assert!((1..=5).contains(&span));
        previous = span;
    }
}

#[test]
fn test_fits_never_runs_past_last_slot() {
    for slot in TimeSlot::all() {
        for span in 1..=5 {
            assert_eq!(fits(slot, span), slot.ordinal() + span - 1 <= 4);
        }
    }
    assert!(fits(ElevenAM, 3));
    assert!(!fits(OnePM, 4));
}

#[test]
fn test_three_hour_job_structural_starts() {
    let span = required_slot_span(&service(180));

    assert_eq!(span, 2);
    assert_eq!(
        structural_starts([NineAM, ElevenAM, FivePM], span),
        vec![NineAM, ElevenAM]
    );
}

// Deadline gate

#[test]
fn test_morning_slot_tomorrow_closes_at_five_today() {
    let policy = BookingPolicy::default();
    let today = date(2025, 6, 2);
    let tomorrow = date(2025, 6, 3);

    for slot in [NineAM, ElevenAM] {
        assert!(is_bookable(tomorrow, slot, at(today, 16, 59, 59), &policy));
        assert!(is_bookable(tomorrow, slot, at(today, 17, 0, 0), &policy));
        assert!(!is_bookable(tomorrow, slot, at(today, 17, 0, 1), &policy));
    }
}

#[test]
fn test_afternoon_slot_tomorrow_closes_at_nine_tomorrow() {
    let policy = BookingPolicy::default();
    let today = date(2025, 6, 2);
    let tomorrow = date(2025, 6, 3);

    assert!(is_bookable(tomorrow, OnePM, at(today, 23, 0, 0), &policy));
    assert!(is_bookable(tomorrow, OnePM, at(tomorrow, 9, 0, 0), &policy));
    assert!(!is_bookable(tomorrow, OnePM, at(tomorrow, 9, 0, 1), &policy));
    assert_eq!(cutoff(tomorrow, FivePM, &policy), at(tomorrow, 9, 0, 0));
}

#[test]
fn test_started_slot_is_unbookable_even_before_cutoff() {
    let policy = BookingPolicy {
        same_day_cutoff: hm(23, 0),
        ..BookingPolicy::default()
    };
    let today = date(2025, 6, 2);

    assert!(is_bookable(today, ThreePM, at(today, 14, 0, 0), &policy));
    assert!(!is_bookable(today, OnePM, at(today, 14, 0, 0), &policy));
}

// Conflict detector

#[test]
fn test_overlap_is_detected_in_both_directions() {
    let day = monday();
    let a = window(day, hm(9, 0), hm(12, 0));
    let b = window(day, hm(11, 0), hm(13, 0));

    let a_as_candidate = CandidateWindow::new(day, a.start_time, a.end_time);
    let b_as_candidate = CandidateWindow::new(day, b.start_time, b.end_time);

    assert!(has_conflict(&a_as_candidate, std::slice::from_ref(&b), None));
    assert!(has_conflict(&b_as_candidate, std::slice::from_ref(&a), None));
}

#[rstest]
#[case(hm(9, 0), hm(11, 0), hm(11, 0), hm(13, 0))]
#[case(hm(13, 0), hm(15, 0), hm(11, 0), hm(13, 0))]
#[case(hm(9, 0), hm(10, 0), hm(15, 0), hm(17, 0))]
fn test_touching_or_disjoint_windows_do_not_conflict(
    #[case] start: NaiveTime,
    #[case] end: NaiveTime,
    #[case] booked_start: NaiveTime,
    #[case] booked_end: NaiveTime,
) {
    let day = monday();
    let booked = window(day, booked_start, booked_end);
    let candidate = CandidateWindow::new(day, start, end);

    assert!(!has_conflict(&candidate, &[booked.clone()], None));

    let reversed = CandidateWindow::new(day, booked_start, booked_end);
    let other = window(day, start, end);
    assert!(!has_conflict(&reversed, &[other], None));
}

#[test]
fn test_cancelled_and_excluded_windows_never_conflict() {
    let day = monday();
    let cancelled = window(day, hm(9, 0), hm(11, 0)).with_status(AppointmentStatus::Cancelled);
    let edited = window(day, hm(11, 0), hm(13, 0));
    let live = window(day, hm(15, 0), hm(17, 0));
    let booked = vec![cancelled, edited.clone(), live.clone()];

    let candidate = CandidateWindow::new(day, hm(9, 0), hm(17, 0));

    assert_eq!(
        conflicting_appointments(&candidate, &booked, Some(edited.appointment_id)),
        vec![live.appointment_id]
    );
    assert_eq!(
        conflicting_appointments(&candidate, &booked, None),
        vec![edited.appointment_id, live.appointment_id]
    );
}

#[test]
fn test_windows_on_other_dates_do_not_conflict() {
    let booked = window(date(2025, 6, 3), hm(9, 0), hm(11, 0));
    let candidate = CandidateWindow::new(monday(), hm(9, 0), hm(11, 0));

    assert!(!has_conflict(&candidate, &[booked], None));
}

// Availability aggregation

#[test]
fn test_monday_scenario_skips_booked_slot() {
    let technician_id = Uuid::new_v4();
    let template = WeeklyTemplate::new().with_day(WeekDay::Monday, [NineAM, ElevenAM, OnePM]);
    let existing = BookedWindow::at_slot(technician_id, monday(), ElevenAM, 120, Uuid::new_v4());

    let booking = CandidateBooking::new(TechnicianSelector::Specific(technician_id), monday(), service(120));
    let inputs = AvailabilityInputs {
        weekly_template: Some(template),
        booked_windows: vec![existing],
        ..Default::default()
    };

    let report = AvailabilityEngine::default().eligible_slots(&booking, &inputs, well_before());

    assert_eq!(report.slots, vec![NineAM, OnePM]);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_other_technicians_bookings_are_ignored() {
    let technician_id = Uuid::new_v4();
    let template = full_week(&[NineAM, ElevenAM]);
    let someone_else = BookedWindow::at_slot(Uuid::new_v4(), monday(), NineAM, 120, Uuid::new_v4());

    let booking = CandidateBooking::new(TechnicianSelector::Specific(technician_id), monday(), service(90));
    let inputs = AvailabilityInputs {
        weekly_template: Some(template),
        booked_windows: vec![someone_else],
        ..Default::default()
    };

    let report = AvailabilityEngine::default().eligible_slots(&booking, &inputs, well_before());

    assert_eq!(report.slots, vec![NineAM, ElevenAM]);
}

#[test]
fn test_multi_slot_job_needs_every_slot_it_covers() {
    let technician_id = Uuid::new_v4();
    let template = WeeklyTemplate::new().with_day(WeekDay::Monday, [NineAM, ElevenAM, FivePM]);

    let booking = CandidateBooking::new(TechnicianSelector::Specific(technician_id), monday(), service(180));
    let inputs = AvailabilityInputs {
        weekly_template: Some(template),
        ..Default::default()
    };

    let report = AvailabilityEngine::default().eligible_slots(&booking, &inputs, well_before());

    // ElevenAM fits structurally but would run into the unscheduled OnePM slot.
    assert_eq!(report.slots, vec![NineAM]);
}

#[test]
fn test_technician_day_closes_at_five() {
    let technician_id = Uuid::new_v4();
    let template = full_week(&TimeSlot::ALL);

    let booking = CandidateBooking::new(TechnicianSelector::Specific(technician_id), monday(), service(120));
    let inputs = AvailabilityInputs {
        weekly_template: Some(template),
        ..Default::default()
    };

    let report = AvailabilityEngine::default().eligible_slots(&booking, &inputs, well_before());

    assert_eq!(report.slots, vec![NineAM, ElevenAM, OnePM, ThreePM]);
}

#[test]
fn test_closing_times_differ_between_modes() {
    let technician_id = Uuid::new_v4();
    let job = service(180);
    let engine = AvailabilityEngine::default();

    let pinned = CandidateBooking::new(TechnicianSelector::Specific(technician_id), monday(), job.clone());
    let pinned_inputs = AvailabilityInputs {
        weekly_template: Some(WeeklyTemplate::new().with_day(WeekDay::Monday, [ThreePM, FivePM])),
        ..Default::default()
    };
    assert!(engine.eligible_slots(&pinned, &pinned_inputs, well_before()).slots.is_empty());

    let pooled = CandidateBooking::new(TechnicianSelector::Any, monday(), job);
    let pooled_inputs = AvailabilityInputs {
        pooled_slots: vec![
            PooledSlot::free(technician_id, ThreePM),
            PooledSlot::free(technician_id, FivePM),
        ],
        ..Default::default()
    };
    assert_eq!(
        engine.eligible_slots(&pooled, &pooled_inputs, well_before()).slots,
        vec![ThreePM]
    );
}

#[test]
fn test_editing_keeps_own_slot_despite_self_conflict() {
    let technician_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();
    let template = WeeklyTemplate::new().with_day(WeekDay::Monday, [NineAM, ElevenAM, OnePM]);
    let own = BookedWindow::at_slot(technician_id, monday(), ElevenAM, 120, appointment_id);

    let booking = CandidateBooking::new(TechnicianSelector::Specific(technician_id), monday(), service(120))
        .with_edit(EditContext {
            appointment_id,
            original_technician_id: technician_id,
            original_date: monday(),
            original_slot: ElevenAM,
        });
    let inputs = AvailabilityInputs {
        weekly_template: Some(template),
        booked_windows: vec![own],
        ..Default::default()
    };

    let report = AvailabilityEngine::default().eligible_slots(&booking, &inputs, well_before());

    assert_eq!(report.slots, vec![NineAM, ElevenAM, OnePM]);
}

#[test]
fn test_editing_keeps_own_slot_past_its_deadline() {
    let technician_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();
    let template = WeeklyTemplate::new().with_day(WeekDay::Monday, [NineAM, OnePM]);
    let own = BookedWindow::at_slot(technician_id, monday(), NineAM, 60, appointment_id);
    // Sunday evening: the Monday morning cutoff has passed, the afternoon one has not.
    let now = at(date(2025, 6, 1), 20, 0, 0);

    let booking = CandidateBooking::new(TechnicianSelector::Specific(technician_id), monday(), service(60))
        .with_edit(EditContext {
            appointment_id,
            original_technician_id: technician_id,
            original_date: monday(),
            original_slot: NineAM,
        });
    let inputs = AvailabilityInputs {
        weekly_template: Some(template),
        booked_windows: vec![own],
        ..Default::default()
    };

    let report = AvailabilityEngine::default().eligible_slots(&booking, &inputs, now);

    assert_eq!(report.slots, vec![NineAM, OnePM]);
}

#[test]
fn test_editing_onto_another_technician_does_not_carry_original_slot() {
    let original_technician = Uuid::new_v4();
    let other_technician = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    let booking = CandidateBooking::new(TechnicianSelector::Specific(other_technician), monday(), service(60))
        .with_edit(EditContext {
            appointment_id,
            original_technician_id: original_technician,
            original_date: monday(),
            original_slot: NineAM,
        });
    let inputs = AvailabilityInputs {
        weekly_template: Some(WeeklyTemplate::new().with_day(WeekDay::Monday, [OnePM])),
        ..Default::default()
    };

    let report = AvailabilityEngine::default().eligible_slots(&booking, &inputs, well_before());

    assert_eq!(report.slots, vec![OnePM]);
}

#[test]
fn test_pooled_slots_are_deduplicated() {
    let booking = CandidateBooking::new(TechnicianSelector::Any, monday(), service(120));
    let inputs = AvailabilityInputs {
        pooled_slots: vec![
            PooledSlot::free(Uuid::new_v4(), ThreePM),
            PooledSlot::free(Uuid::new_v4(), ThreePM),
        ],
        ..Default::default()
    };

    let report = AvailabilityEngine::default().eligible_slots(&booking, &inputs, well_before());

    assert_eq!(report.slots, vec![ThreePM]);
}

#[test]
fn test_pooled_mode_orders_and_filters() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let edited = Uuid::new_v4();
    let booking = CandidateBooking::new(TechnicianSelector::Any, monday(), service(60)).with_edit(EditContext {
        appointment_id: edited,
        original_technician_id: b,
        original_date: monday(),
        original_slot: NineAM,
    });
    let inputs = AvailabilityInputs {
        pooled_slots: vec![
            PooledSlot::free(a, FivePM),
            PooledSlot::booked(a, OnePM, Uuid::new_v4()),
            PooledSlot::booked(b, NineAM, edited),
            PooledSlot::free(b, ElevenAM),
        ],
        ..Default::default()
    };

    let report = AvailabilityEngine::default().eligible_slots(&booking, &inputs, well_before());

    assert_eq!(report.slots, vec![NineAM, ElevenAM, FivePM]);
}

#[test]
fn test_missing_inputs_yield_empty_result() {
    let engine = AvailabilityEngine::default();
    let inputs = AvailabilityInputs::default();

    for selector in [TechnicianSelector::Specific(Uuid::new_v4()), TechnicianSelector::Any] {
        let booking = CandidateBooking::new(selector, monday(), service(120));
        let report = engine.eligible_slots(&booking, &inputs, well_before());
        assert!(report.is_empty());
        assert!(report.warnings.is_empty());
    }
}

#[test]
fn test_malformed_override_warning_reaches_report() {
    let technician_id = Uuid::new_v4();
    let booking = CandidateBooking::new(TechnicianSelector::Specific(technician_id), monday(), service(60));
    let inputs = AvailabilityInputs {
        date_override: Some(DateOverride::new(technician_id, monday(), [OnePM, NineAM])),
        ..Default::default()
    };

    let report = AvailabilityEngine::default().eligible_slots(&booking, &inputs, well_before());

    assert_eq!(report.slots, vec![NineAM, OnePM]);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].is_warning());
}

#[test]
fn test_every_returned_window_stays_inside_effective_slots() {
    let technician_id = Uuid::new_v4();
    let template = WeeklyTemplate::new().with_day(WeekDay::Monday, [NineAM, ElevenAM, ThreePM, FivePM]);
    let engine = AvailabilityEngine::default();

    for minutes in [30, 120, 150, 240, 300] {
        let job = service(minutes);
        let booking = CandidateBooking::new(TechnicianSelector::Specific(technician_id), monday(), job.clone());
        let inputs = AvailabilityInputs {
            weekly_template: Some(template.clone()),
            ..Default::default()
        };

        for start in engine.eligible_slots(&booking, &inputs, well_before()).slots {
            let window = CandidateWindow::for_slot(monday(), start, &job);
            assert!(window.ends_by(engine.policy().technician_close));
            for ordinal in start.ordinal()..start.ordinal() + required_slot_span(&job) {
                let covered = TimeSlot::from_ordinal(ordinal).unwrap();
                assert!(template.slots_for(WeekDay::Monday).unwrap().contains(&covered));
            }
        }
    }
}
