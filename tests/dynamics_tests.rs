use phys_vehicle::{
    bodies::RigidBodyType,
    components::{
        AckermannGeometry, AutoboxConfig, Differential4WConfig, DifferentialType, Gear,
        GearboxConfig, SuspensionConfig, TireConfig, TireLoadFilter, TrackSide, WheelConfig,
    },
    core::{RaycastHit, VehicleTuningContext},
    dynamics::{
        differential::{diff_ratios_4w, split_torque, tank_ratios},
        drivetrain::{solve_coupled, solve_tank, solve_uncoupled},
        steering::{ackermann_steer_angles, steer_angles_4w},
        suspension::{resolve, suspension_ray},
        tire::compute_slips,
        CombinedSlipTireModel, DrivenWheel, EngineInput, GearboxState, LinearTireModel,
        StickyTireState, SuspensionInput, TireForceInput, TireForceModel,
    },
    math::{Point3, Transform, Vector3},
    surface::MaterialId,
};
use approx::assert_relative_eq;
use nalgebra::Translation3;
use rand::{rngs::StdRng, Rng, SeedableRng};

const SUB_DT: f32 = 1.0 / 180.0;

fn gravity() -> Vector3 {
    Vector3::new(0.0, -9.81, 0.0)
}

fn com_at_height(y: f32) -> Transform {
    Transform::from_parts(Translation3::new(0.0, y, 0.0), nalgebra::UnitQuaternion::identity())
}

fn ground_hit(x: f32, z: f32) -> RaycastHit {
    RaycastHit {
        distance: 0.0,
        point: Point3::new(x, 0.0, z),
        normal: Vector3::y(),
        material: MaterialId(0),
        actor: None,
        actor_type: RigidBodyType::Static,
    }
}

fn corner() -> (WheelConfig, SuspensionConfig) {
    let mut suspension = SuspensionConfig::at(Vector3::new(0.8, -0.35, 1.3));
    suspension.sprung_mass = 375.0;
    (WheelConfig::default(), suspension)
}

// Steering

#[test]
fn test_zero_steer_gives_toe_only() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let wheels: Vec<WheelConfig> = (0..6)
            .map(|_| {
                WheelConfig::default()
                    .with_max_steer(rng.gen_range(0.0..1.2))
                    .with_toe(rng.gen_range(-0.05..0.05))
            })
            .collect();
        let geometry = AckermannGeometry {
            accuracy: rng.gen_range(0.0..=1.0),
            ..AckermannGeometry::default()
        };

        let mut angles = vec![1.0; wheels.len()];
        steer_angles_4w(0.0, &wheels, &geometry, &mut angles);

        for (angle, wheel) in angles.iter().zip(&wheels) {
            assert_eq!(*angle, wheel.toe_angle);
        }
    }
}

#[test]
fn test_ackermann_outer_wheel_turns_less() {
    let full = ackermann_steer_angles(0.5, 1.0, 1.0, 1.6, 2.6);
    let none = ackermann_steer_angles(0.5, 1.0, 0.0, 1.6, 2.6);

    // Turning left: left wheel is inner
    assert_relative_eq!(full.left, 0.5);
    assert!(full.right < full.left);
    let perfect = (2.6f32 / (1.6 + 2.6 / 0.5f32.tan())).atan();
    assert_relative_eq!(full.right, perfect, epsilon = 1e-6);

    // Zero accuracy steers both wheels equally
    assert_relative_eq!(none.left, none.right);
}

// Suspension

#[test]
fn test_no_hit_is_fully_drooped_and_unloaded() {
    let mut rng = StdRng::seed_from_u64(11);
    let filter = TireLoadFilter::default();
    for _ in 0..50 {
        let wheel = WheelConfig::new(
            rng.gen_range(0.1..0.6),
            0.2,
            rng.gen_range(5.0..50.0),
            rng.gen_range(0.1..3.0),
        );
        let mut suspension = SuspensionConfig::at(Vector3::new(0.8, -0.35, 1.3));
        suspension.max_droop = rng.gen_range(0.0..0.3);

        let pose = com_at_height(rng.gen_range(0.0..2.0));
        let contact = resolve(&SuspensionInput {
            wheel: &wheel,
            suspension: &suspension,
            load_filter: &filter,
            hit: None,
            com_pose: &pose,
            prev_jounce: None,
            dt: SUB_DT,
            gravity: gravity(),
            min_contact_cosine: 1e-3,
        });

        assert!(!contact.in_contact);
        assert_eq!(contact.jounce, -suspension.max_droop);
        assert_eq!(contact.tire_load, 0.0);
        assert_eq!(contact.force, Vector3::zeros());
    }
}

#[test]
fn test_rest_height_supports_sprung_mass() {
    let (wheel, suspension) = corner();
    let filter = TireLoadFilter::default();
    let pose = com_at_height(0.65);
    let hit = ground_hit(0.8, 1.3);

    let contact = resolve(&SuspensionInput {
        wheel: &wheel,
        suspension: &suspension,
        load_filter: &filter,
        hit: Some(&hit),
        com_pose: &pose,
        prev_jounce: None,
        dt: SUB_DT,
        gravity: gravity(),
        min_contact_cosine: 1e-3,
    });

    assert!(contact.in_contact);
    assert_relative_eq!(contact.jounce, 0.0, epsilon = 1e-5);
    assert_relative_eq!(contact.force.y, 375.0 * 9.81, epsilon = 0.5);
    assert_relative_eq!(contact.normalized_load, 1.0, epsilon = 1e-3);
    assert_relative_eq!(contact.contact_point.y, 0.0, epsilon = 1e-5);
}

#[test]
fn test_jounce_is_clamped_with_limit_error() {
    let (wheel, suspension) = corner();
    let filter = TireLoadFilter::default();
    let hit = ground_hit(0.8, 1.3);

    // Wheel centre 0.45 m below where the tire would touch
    let pose = com_at_height(0.2);
    let contact = resolve(&SuspensionInput {
        wheel: &wheel,
        suspension: &suspension,
        load_filter: &filter,
        hit: Some(&hit),
        com_pose: &pose,
        prev_jounce: None,
        dt: SUB_DT,
        gravity: gravity(),
        min_contact_cosine: 1e-3,
    });
    assert_relative_eq!(contact.jounce, suspension.max_compression);
    assert_relative_eq!(contact.limit_error, 0.15, epsilon = 1e-5);

    // Hit exists but the spring is past full droop
    let pose = com_at_height(0.8);
    let contact = resolve(&SuspensionInput {
        wheel: &wheel,
        suspension: &suspension,
        load_filter: &filter,
        hit: Some(&hit),
        com_pose: &pose,
        prev_jounce: None,
        dt: SUB_DT,
        gravity: gravity(),
        min_contact_cosine: 1e-3,
    });
    assert!(!contact.in_contact);
    assert_eq!(contact.jounce, -suspension.max_droop);
}

#[test]
fn test_jounce_stays_within_travel() {
    let (wheel, suspension) = corner();
    let filter = TireLoadFilter::default();
    let hit = ground_hit(0.8, 1.3);
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..200 {
        let pose = com_at_height(rng.gen_range(-0.5..1.5));
        let contact = resolve(&SuspensionInput {
            wheel: &wheel,
            suspension: &suspension,
            load_filter: &filter,
            hit: Some(&hit),
            com_pose: &pose,
            prev_jounce: Some(rng.gen_range(-0.1..0.3)),
            dt: SUB_DT,
            gravity: gravity(),
            min_contact_cosine: 1e-3,
        });
        assert!(contact.jounce >= -suspension.max_droop);
        assert!(contact.jounce <= suspension.max_compression);
        assert!(contact.limit_error >= 0.0);
        assert!(contact.tire_load >= 0.0);
    }
}

#[test]
fn test_damper_resists_compression() {
    let (wheel, suspension) = corner();
    let filter = TireLoadFilter::default();
    let hit = ground_hit(0.8, 1.3);
    let pose = com_at_height(0.65);

    let input = |prev: f32| SuspensionInput {
        wheel: &wheel,
        suspension: &suspension,
        load_filter: &filter,
        hit: Some(&hit),
        com_pose: &pose,
        prev_jounce: Some(prev),
        dt: 0.01,
        gravity: gravity(),
        min_contact_cosine: 1e-3,
    };
    // Compressing at 1 m/s: jounce grew by 0.01 over the 0.01 s substep
    let at_rest = resolve(&input(0.0));
    let falling = resolve(&input(-0.01));
    assert_relative_eq!(
        falling.spring_force - at_rest.spring_force,
        suspension.spring_damper_rate,
        epsilon = 0.5
    );
}

#[test]
fn test_landing_wheel_has_no_damper_force() {
    let (wheel, suspension) = corner();
    let filter = TireLoadFilter::default();
    let hit = ground_hit(0.8, 1.3);
    let pose = com_at_height(0.6);

    let contact = |prev_jounce: Option<f32>| {
        resolve(&SuspensionInput {
            wheel: &wheel,
            suspension: &suspension,
            load_filter: &filter,
            hit: Some(&hit),
            com_pose: &pose,
            prev_jounce,
            dt: SUB_DT,
            gravity: gravity(),
            min_contact_cosine: 1e-3,
        })
    };
    let landing = contact(None);
    let holding = contact(Some(landing.jounce));

    // Spring only: sprung weight plus 5 cm of compression
    let expected = 375.0 * 9.81 + suspension.spring_strength * 0.05;
    assert_relative_eq!(landing.jounce, 0.05, epsilon = 1e-5);
    assert_relative_eq!(landing.spring_force, expected, epsilon = 0.5);
    assert_eq!(holding.spring_force, landing.spring_force);
}

#[test]
fn test_parallel_contact_is_airborne() {
    let (wheel, suspension) = corner();
    let filter = TireLoadFilter::default();
    let pose = com_at_height(0.65);
    let mut hit = ground_hit(0.8, 1.3);
    hit.normal = Vector3::x();

    let contact = resolve(&SuspensionInput {
        wheel: &wheel,
        suspension: &suspension,
        load_filter: &filter,
        hit: Some(&hit),
        com_pose: &pose,
        prev_jounce: None,
        dt: SUB_DT,
        gravity: gravity(),
        min_contact_cosine: 1e-3,
    });
    assert!(!contact.in_contact);
}

#[test]
fn test_suspension_ray_spans_full_travel() {
    let (wheel, suspension) = corner();
    let ray = suspension_ray(&com_at_height(0.65), &suspension, &wheel);

    // Top of the wheel at full compression
    assert_relative_eq!(ray.origin.y, 0.65 - 0.35 + 0.3 + 0.3, epsilon = 1e-5);
    assert_relative_eq!(ray.direction, -Vector3::y());
    assert_relative_eq!(ray.length, 0.3 + 0.3 + 0.1 + 0.6, epsilon = 1e-5);
}

// Tire

fn tire_input(long_slip: f32, lat_slip: f32, camber: f32) -> TireForceInput {
    TireForceInput {
        friction: 1.0,
        long_slip,
        lat_slip,
        camber,
        omega: 10.0,
        radius: 0.3,
        rest_load: 3875.0,
        normalized_load: 1.0,
        load: 3875.0,
        gravity: 9.81,
    }
}

#[test]
fn test_zero_slip_gives_zero_force() {
    let tire = TireConfig::default();
    let models: [&dyn TireForceModel; 2] = [&CombinedSlipTireModel, &LinearTireModel];
    for model in models {
        let forces = model.compute(&tire, &tire_input(0.0, 0.0, 0.0));
        assert_eq!(forces.long_force, 0.0);
        assert_eq!(forces.lat_force, 0.0);
        assert_eq!(forces.align_moment, 0.0);
        assert_eq!(forces.wheel_torque, 0.0);
    }
}

#[test]
fn test_tire_forces_oppose_slip_within_friction_circle() {
    let tire = TireConfig::default();
    let mut rng = StdRng::seed_from_u64(19);
    let models: [&dyn TireForceModel; 2] = [&CombinedSlipTireModel, &LinearTireModel];

    for _ in 0..200 {
        let long = rng.gen_range(-1.0..1.0);
        let lat = rng.gen_range(-0.5..0.5);
        let input = tire_input(long, lat, 0.0);
        for model in models {
            let forces = model.compute(&tire, &input);
            let magnitude = forces.long_force.hypot(forces.lat_force);
            assert!(magnitude <= input.friction * input.load * 1.01);
            assert!(forces.long_force * long >= 0.0);
            assert!(forces.lat_force * lat <= 0.0);
            assert_relative_eq!(forces.wheel_torque, -forces.long_force * input.radius);
        }
    }
}

#[test]
fn test_camber_alone_produces_lateral_force() {
    let forces = CombinedSlipTireModel.compute(&TireConfig::default(), &tire_input(0.0, 0.0, 0.05));
    assert!(forces.lat_force > 0.0);
    assert_relative_eq!(forces.long_force, 0.0);
}

#[test]
fn test_friction_curve_is_never_negative() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..50 {
        let x1 = rng.gen_range(0.01..0.5);
        let x2 = rng.gen_range(x1 + 0.01..2.0);
        let tire = TireConfig {
            friction_vs_slip: [
                [0.0, rng.gen_range(0.0..2.0)],
                [x1, rng.gen_range(0.0..2.0)],
                [x2, rng.gen_range(0.0..2.0)],
            ],
            ..TireConfig::default()
        };
        assert!(tire.validate(0).is_ok());
        for _ in 0..50 {
            assert!(tire.friction_at(rng.gen_range(-5.0..5.0)) >= 0.0);
        }
    }
}

#[test]
fn test_slips() {
    // Free rolling
    let rolling = compute_slips(10.0, 0.0, 10.0 / 0.3, 0.3, false, 4.0, 1.0);
    assert_relative_eq!(rolling.long, 0.0, epsilon = 1e-6);
    assert_eq!(rolling.lat, 0.0);

    // Locked wheel sliding forward
    let locked = compute_slips(10.0, 0.0, 0.0, 0.3, true, 4.0, 1.0);
    assert_relative_eq!(locked.long, -1.0);

    // Near rest the free-rolling floor bounds the slip
    let creeping = compute_slips(0.1, 0.0, 0.0, 0.3, false, 4.0, 1.0);
    assert_relative_eq!(creeping.long, -0.1 / 4.0);

    // Sideways motion
    let sliding = compute_slips(0.0, 1.0, 0.0, 0.3, false, 4.0, 1.0);
    assert_relative_eq!(sliding.lat, 1.0f32.atan());
    assert_eq!(sliding.long, 0.0);
}

// Sticky tire

#[test]
fn test_sticky_tire_engages() {
    let tuning = VehicleTuningContext::default();

    let mut at_rest = StickyTireState::default();
    at_rest.update(true, 0.0, 0.0, 0.0, 0.3, false, 0.01, &tuning);
    assert!(at_rest.long_active);

    let mut creeping = StickyTireState::default();
    for _ in 0..90 {
        creeping.update(true, 0.05, 0.05, 0.1, 0.3, false, 0.01, &tuning);
    }
    assert!(!creeping.long_active);
    for _ in 0..20 {
        creeping.update(true, 0.05, 0.05, 0.1, 0.3, false, 0.01, &tuning);
    }
    assert!(creeping.long_active);
    assert!(creeping.lat_active);

    // Throttle releases it
    creeping.update(true, 0.05, 0.05, 0.1, 0.3, true, 0.01, &tuning);
    assert!(!creeping.long_active);
    assert_eq!(creeping.long_timer, 0.0);

    // Leaving the ground resets everything
    at_rest.update(false, 0.0, 0.0, 0.0, 0.3, false, 0.01, &tuning);
    assert_eq!(at_rest, StickyTireState::default());
}

// Differential

#[test]
fn test_open_differential_splits() {
    let config = Differential4WConfig {
        kind: DifferentialType::Open4WD,
        ..Differential4WConfig::default()
    };
    let ratios = diff_ratios_4w(&config, [1.0, 5.0, 2.0, 0.0]);
    assert_relative_eq!(ratios.torque.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
    assert_eq!(ratios.torque, ratios.speed);
    assert_relative_eq!(ratios.torque[0] + ratios.torque[1], config.front_rear_split);

    let rear = Differential4WConfig {
        kind: DifferentialType::OpenRearWD,
        ..Differential4WConfig::default()
    };
    let ratios = diff_ratios_4w(&rear, [0.0; 4]);
    assert_eq!(ratios.torque[0], 0.0);
    assert_eq!(ratios.torque[1], 0.0);
    assert_relative_eq!(ratios.torque[2] + ratios.torque[3], 1.0);
}

#[test]
fn test_limited_slip_favours_slower_wheel() {
    let (fast, slow) = split_torque(10.0, 2.0, 1.3, 0.5);
    assert!(slow > fast);
    assert_relative_eq!(fast + slow, 1.0, epsilon = 1e-6);

    // Within the bias ratio the default split holds
    let (a, b) = split_torque(1.2, 1.0, 1.3, 0.5);
    assert_relative_eq!(a, 0.5);
    assert_relative_eq!(b, 0.5);

    // Both stationary
    let (a, b) = split_torque(0.0, 0.0, 1.3, 0.4);
    assert_relative_eq!(a, 0.4);
    assert_relative_eq!(b, 0.6);
}

#[test]
fn test_tank_ratios() {
    let sides = [TrackSide::Left, TrackSide::Right, TrackSide::Left, TrackSide::Right];
    let mut ratios = [0.0; 4];

    tank_ratios(1.0, 1.0, &sides, &mut ratios);
    for ratio in ratios {
        assert_relative_eq!(ratio, 0.25);
    }

    tank_ratios(1.0, -1.0, &sides, &mut ratios);
    assert_relative_eq!(ratios[0], 0.25);
    assert_relative_eq!(ratios[1], -0.25);

    tank_ratios(0.0, 0.0, &sides, &mut ratios);
    assert_eq!(ratios, [0.0; 4]);
}

// Drivetrain

fn driven(omega: f32, torque: f32, ratio: f32, brake_torque: f32) -> DrivenWheel {
    DrivenWheel {
        omega,
        recip_moi: 1.0,
        damping_rate: 0.25,
        torque,
        torque_ratio: ratio,
        speed_ratio: ratio,
        brake_torque,
    }
}

fn engine(omega: f32, drive_torque: f32) -> EngineInput {
    EngineInput {
        omega,
        moi: 1.0,
        drive_torque,
        damping_rate: 0.15,
        max_omega: 600.0,
    }
}

#[test]
fn test_stationary_drivetrain_is_a_fixed_point() {
    let wheels = [driven(0.0, 0.0, 0.25, 0.0); 4];
    let mut out = [1.0; 4];

    let solution = solve_coupled(&wheels, &engine(0.0, 0.0), 16.0, 10.0, 1.0 / 60.0, &mut out);

    assert_eq!(solution.engine_omega, 0.0);
    for omega in out {
        assert_eq!(omega, 0.0);
    }
}

#[test]
fn test_brake_sign_flip_stops_wheel() {
    let wheels = [
        driven(1.0, -1000.0, 0.25, 1000.0),
        driven(-1.0, 1000.0, 0.25, 1000.0),
        driven(1.0, -1000.0, 0.25, 0.0),
        driven(50.0, -10.0, 0.25, 10.0),
    ];
    let mut out = [0.0; 4];
    solve_coupled(&wheels, &engine(0.0, 0.0), 0.0, 10.0, 0.1, &mut out);

    assert_eq!(out[0], 0.0);
    assert_eq!(out[1], 0.0);
    // No brake, so the flip stands
    assert!(out[2] < 0.0);
    // Braked but still turning the same way
    assert!(out[3] > 0.0);

    let mut single = [0.0; 1];
    solve_uncoupled(&wheels[..1], 0.1, &mut single);
    assert_eq!(single[0], 0.0);
}

#[test]
fn test_brake_holds_wheel_at_rest_up_to_its_torque() {
    let dt = 0.1;
    let wheels = [
        // Tire torque within what the brake can hold
        driven(0.0, 300.0, 0.0, 500.0),
        // Drive torque beats a light brake
        driven(0.0, 300.0, 0.0, 15.0),
        driven(0.0, -300.0, 0.0, 15.0),
        driven(0.0, 300.0, 0.0, 0.0),
    ];
    let mut out = [0.0; 4];
    solve_uncoupled(&wheels, dt, &mut out);

    let free = out[3];
    assert!(free > 0.0);
    assert_eq!(out[0], 0.0);
    assert_relative_eq!(out[1], free - 15.0 * dt, epsilon = 1e-4);
    assert_relative_eq!(out[2], -(free - 15.0 * dt), epsilon = 1e-4);
}

#[test]
fn test_lighter_wheel_spins_up_faster() {
    let mut light = driven(0.0, 100.0, 0.0, 0.0);
    light.recip_moi = 2.0;
    let heavy = driven(0.0, 100.0, 0.0, 0.0);
    let mut out = [0.0; 2];
    solve_uncoupled(&[light, heavy], 0.01, &mut out);

    // (ω + dt·T/I) / (1 + dt·d/I)
    assert_relative_eq!(out[0], 2.0 / (1.0 + 0.005), epsilon = 1e-5);
    assert_relative_eq!(out[1], 1.0 / (1.0 + 0.0025), epsilon = 1e-5);
}

#[test]
fn test_light_brake_does_not_pin_driven_wheels() {
    let dt = 1.0 / 180.0;
    let mut wheels = [driven(0.0, 0.0, 0.25, 15.0); 4];
    let mut engine_omega = 200.0;
    let mut out = [0.0; 4];

    for _ in 0..60 {
        let solution = solve_coupled(&wheels, &engine(engine_omega, 400.0), 16.0, 10.0, dt, &mut out);
        engine_omega = solution.engine_omega;
        for (wheel, omega) in wheels.iter_mut().zip(out) {
            // Brake opposes the spin once the wheel turns
            wheel.torque = if omega == 0.0 { 0.0 } else { -omega.signum() * 15.0 };
            wheel.omega = omega;
        }
    }
    for omega in out {
        assert!(omega > 0.0);
    }
}

#[test]
fn test_throttle_spins_drivetrain_up_monotonically() {
    let dt = 1.0 / 180.0;
    let mut wheels = [driven(0.0, 0.0, 0.25, 0.0); 4];
    let mut engine_omega = 0.0;
    let mut out = [0.0; 4];

    let mut last_engine = 0.0;
    let mut last_wheel = 0.0;
    for _ in 0..600 {
        let solution = solve_coupled(&wheels, &engine(engine_omega, 400.0), 16.0, 10.0, dt, &mut out);
        engine_omega = solution.engine_omega;
        for (wheel, omega) in wheels.iter_mut().zip(out) {
            wheel.omega = omega;
        }

        assert!(engine_omega >= last_engine - 1e-2);
        assert!(out[0] >= last_wheel - 1e-2);
        assert!(engine_omega <= 600.0);
        last_engine = engine_omega;
        last_wheel = out[0];
    }
    assert!(last_engine > 0.0);
    assert!(last_wheel > 0.0);
}

#[test]
fn test_neutral_decouples_engine() {
    let wheels = [driven(0.0, 0.0, 0.25, 0.0); 4];
    let mut out = [0.0; 4];
    let solution = solve_coupled(&wheels, &engine(100.0, 400.0), 0.0, 10.0, 0.01, &mut out);

    assert!(solution.engine_omega > 100.0);
    assert_eq!(out, [0.0; 4]);
}

#[test]
fn test_engine_speed_is_clamped() {
    let wheels = [driven(0.0, 0.0, 0.25, 0.0); 4];
    let mut out = [0.0; 4];
    let solution = solve_coupled(&wheels, &engine(599.0, 1.0e6), 0.0, 10.0, 0.1, &mut out);
    assert_eq!(solution.engine_omega, 600.0);
}

#[test]
fn test_tank_tracks_share_speed() {
    let sides = [TrackSide::Left, TrackSide::Right, TrackSide::Left, TrackSide::Right];
    let mut ratios = [0.0; 4];
    tank_ratios(1.0, 0.5, &sides, &mut ratios);

    let wheels: Vec<DrivenWheel> = ratios
        .iter()
        .enumerate()
        .map(|(i, ratio)| driven(i as f32 * 0.1, 0.0, *ratio, 0.0))
        .collect();
    let mut out = [0.0; 4];
    let solution = solve_tank(&wheels, &sides, &engine(50.0, 400.0), 16.0, 10.0, 0.01, &mut out);

    assert_eq!(out[0], out[2]);
    assert_eq!(out[1], out[3]);
    assert!(out[0] > out[1]);
    assert!(solution.engine_omega > 0.0);
}

// Gearbox

#[test]
fn test_gear_change_passes_through_neutral() {
    let gears = GearboxConfig::default();
    let mut gearbox = GearboxState::new();
    assert_eq!(gearbox.current_gear(), Gear::Neutral);

    gearbox.request_gear_up();
    let output = gearbox.update(0.125, &gears, None, 0.0, 1.0);
    assert_eq!(gearbox.current_gear(), Gear::Neutral);
    assert_eq!(gearbox.target_gear(), Gear::FIRST);
    assert_eq!(output.gear_ratio, 0.0);

    for i in 0..5 {
        // A second request mid-shift is dropped
        if i == 1 {
            gearbox.request_gear_up();
        }
        gearbox.update(0.125, &gears, None, 0.0, 1.0);
        assert_eq!(gearbox.current_gear(), Gear::Neutral);
    }
    assert!(gearbox.switch_elapsed() > gears.switch_time);

    let output = gearbox.update(0.125, &gears, None, 0.0, 1.0);
    assert_eq!(gearbox.current_gear(), Gear::FIRST);
    assert_eq!(gearbox.target_gear(), Gear::FIRST);
    assert_relative_eq!(output.gear_ratio, 4.0 * 4.0);
    assert_eq!(output.accel, 1.0);
}

#[test]
fn test_opposite_requests_cancel() {
    let gears = GearboxConfig::default();
    let mut gearbox = GearboxState::new();
    gearbox.force_gear(Gear::Forward(2));

    gearbox.request_gear_up();
    gearbox.request_gear_down();
    gearbox.update(0.1, &gears, None, 0.0, 0.0);
    assert!(!gearbox.is_shifting());
    assert_eq!(gearbox.current_gear(), Gear::Forward(2));
}

#[test]
fn test_autobox_shifts_up_and_cuts_throttle() {
    let gears = GearboxConfig::default();
    let autobox = AutoboxConfig::for_gears(gears.forward_count());
    let mut gearbox = GearboxState::new();
    gearbox.set_use_autobox(true);
    gearbox.force_gear(Gear::FIRST);

    // Latency has to elapse first
    for _ in 0..5 {
        gearbox.update(0.5, &gears, Some(&autobox), 0.9, 1.0);
        assert_eq!(gearbox.current_gear(), Gear::FIRST);
    }

    gearbox.update(0.5, &gears, Some(&autobox), 0.9, 1.0);
    assert_eq!(gearbox.current_gear(), Gear::Neutral);
    assert_eq!(gearbox.target_gear(), Gear::Forward(2));

    let output = gearbox.update(0.1, &gears, Some(&autobox), 0.9, 1.0);
    assert_eq!(output.accel, 0.0);
}

#[test]
fn test_autobox_engages_first_from_neutral_on_throttle() {
    let gears = GearboxConfig::default();
    let autobox = AutoboxConfig::for_gears(gears.forward_count());
    let mut gearbox = GearboxState::new();
    gearbox.set_use_autobox(true);

    // No throttle, no gear
    for _ in 0..10 {
        gearbox.update(0.5, &gears, Some(&autobox), 0.0, 0.0);
    }
    assert_eq!(gearbox.target_gear(), Gear::Neutral);

    gearbox.update(0.1, &gears, Some(&autobox), 0.0, 1.0);
    assert_eq!(gearbox.target_gear(), Gear::FIRST);

    for _ in 0..10 {
        gearbox.update(0.1, &gears, Some(&autobox), 0.0, 1.0);
    }
    assert_eq!(gearbox.current_gear(), Gear::FIRST);
}

#[test]
fn test_autobox_shifts_down_at_low_revs() {
    let gears = GearboxConfig::default();
    let autobox = AutoboxConfig::for_gears(gears.forward_count());
    let mut gearbox = GearboxState::new();
    gearbox.set_use_autobox(true);
    gearbox.force_gear(Gear::Forward(3));

    for _ in 0..6 {
        gearbox.update(0.5, &gears, Some(&autobox), 0.2, 0.0);
    }
    assert_eq!(gearbox.target_gear(), Gear::Forward(2));

    // Never below first
    gearbox.force_gear(Gear::FIRST);
    for _ in 0..10 {
        gearbox.update(0.5, &gears, Some(&autobox), 0.0, 0.0);
    }
    assert_eq!(gearbox.target_gear(), Gear::FIRST);
}
