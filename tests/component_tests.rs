use phys_vehicle::{
    components::{
        AckermannGeometry, AutoboxConfig, ClutchConfig, Differential4WConfig, DifferentialType,
        EngineConfig, Gear, GearboxConfig, SuspensionConfig, TireConfig, TireLoadFilter,
        WheelConfig,
    },
    core::{SubstepConfig, VehicleTuningContext},
    error::VehicleError,
    math::{
        linear::{solve_least_squares, solve_square, LuDecomposition},
        LookupTable, Vector3,
    },
    surface::{FrictionPairs, MaterialId, SurfaceType, SurfaceTypeLookup, TireType},
    vehicle::{compute_sprung_masses, smooth_inputs_4w, DriveInputs4W, InputSmoothing},
};
use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector};

// Configuration checks

#[test]
fn test_default_configs_are_valid() {
    assert!(WheelConfig::default().validate(0).is_ok());
    assert!(SuspensionConfig::default().validate(0).is_ok());
    assert!(TireConfig::default().validate(0).is_ok());
    assert!(TireLoadFilter::default().validate().is_ok());
    assert!(EngineConfig::default().validate().is_ok());
    assert!(GearboxConfig::default().validate().is_ok());
    assert!(ClutchConfig::default().validate().is_ok());
    assert!(Differential4WConfig::default().validate().is_ok());
    assert!(AckermannGeometry::default().validate().is_ok());
    assert!(VehicleTuningContext::default().validate().is_ok());
    assert!(SubstepConfig::default().validate().is_ok());

    let gears = GearboxConfig::default();
    assert!(AutoboxConfig::for_gears(gears.forward_count()).validate(&gears).is_ok());
}

#[test]
fn test_invalid_wheel_and_suspension() {
    let mut wheel = WheelConfig::default();
    wheel.max_steer = 2.0;
    assert!(matches!(wheel.validate(3), Err(VehicleError::InvalidWheel { wheel: 3, .. })));

    let mut stale = WheelConfig::default();
    stale.radius = 0.5;
    assert!(stale.validate(0).is_err());
    stale.refresh_reciprocals();
    assert!(stale.validate(0).is_ok());

    let suspension = SuspensionConfig {
        travel_direction: Vector3::new(0.0, -2.0, 0.0),
        ..SuspensionConfig::default()
    };
    assert!(matches!(
        suspension.validate(1),
        Err(VehicleError::InvalidSuspension { wheel: 1, .. })
    ));

    let suspension = SuspensionConfig {
        sprung_mass: 0.0,
        ..SuspensionConfig::default()
    };
    assert!(suspension.validate(0).is_err());
}

#[test]
fn test_invalid_tire_and_load_filter() {
    let mut tire = TireConfig::default();
    tire.friction_vs_slip[1][0] = tire.friction_vs_slip[2][0] + 1.0;
    assert!(matches!(tire.validate(2), Err(VehicleError::InvalidTire { wheel: 2, .. })));

    let tire = TireConfig {
        lat_stiff_x: 0.0,
        ..TireConfig::default()
    };
    assert!(tire.validate(0).is_err());

    let filter = TireLoadFilter {
        min_normalized_load: 2.0,
        max_normalized_load: 1.0,
        max_filtered_normalized_load: 3.0,
    };
    assert!(filter.validate().is_err());
}

#[test]
fn test_invalid_drivetrain_configs() {
    let engine = EngineConfig {
        max_omega: 0.0,
        ..EngineConfig::default()
    };
    assert!(matches!(engine.validate(), Err(VehicleError::InvalidEngine(_))));

    let gears = GearboxConfig {
        forward_ratios: vec![4.0, 4.0, 1.0],
        ..GearboxConfig::default()
    };
    assert!(matches!(gears.validate(), Err(VehicleError::InvalidGears(_))));

    let gears = GearboxConfig {
        reverse_ratio: 1.0,
        ..GearboxConfig::default()
    };
    assert!(gears.validate().is_err());

    let default_gears = GearboxConfig::default();
    let autobox = AutoboxConfig::for_gears(2);
    assert!(matches!(
        autobox.validate(&default_gears),
        Err(VehicleError::InvalidAutobox(_))
    ));
    let mut autobox = AutoboxConfig::for_gears(default_gears.forward_count());
    autobox.down_ratios[0] = 0.9;
    assert!(autobox.validate(&default_gears).is_err());

    assert!(matches!(
        ClutchConfig { strength: 0.0 }.validate(),
        Err(VehicleError::InvalidClutch(_))
    ));

    let differential = Differential4WConfig {
        front_rear_split: 1.5,
        ..Differential4WConfig::default()
    };
    assert!(matches!(
        differential.validate(),
        Err(VehicleError::InvalidDifferential(_))
    ));
    let differential = Differential4WConfig {
        kind: DifferentialType::LimitedSlip4WD,
        front_bias: 0.5,
        ..Differential4WConfig::default()
    };
    assert!(differential.validate().is_err());
    let differential = Differential4WConfig {
        kind: DifferentialType::Open4WD,
        front_bias: 0.5,
        ..Differential4WConfig::default()
    };
    assert!(differential.validate().is_ok());

    let ackermann = AckermannGeometry {
        accuracy: 1.5,
        ..AckermannGeometry::default()
    };
    assert!(matches!(ackermann.validate(), Err(VehicleError::InvalidAckermann(_))));
}

#[test]
fn test_tuning_basis_must_be_orthonormal() {
    assert!(VehicleTuningContext::with_basis(Vector3::z(), Vector3::x()).is_ok());
    assert!(matches!(
        VehicleTuningContext::with_basis(Vector3::y(), Vector3::new(0.0, 1.0, 1.0)),
        Err(VehicleError::InvalidTuning(_))
    ));
    assert!(VehicleTuningContext::with_basis(Vector3::y(), Vector3::y()).is_err());

    // Lateral points to the vehicle's left
    let tuning = VehicleTuningContext::default();
    assert_relative_eq!(tuning.lateral(), Vector3::x());
}

#[test]
fn test_substep_count_follows_speed() {
    let substeps = SubstepConfig::default();
    assert_eq!(substeps.count_for(0.0), 3);
    assert_eq!(substeps.count_for(-4.9), 3);
    assert_eq!(substeps.count_for(5.0), 2);
    assert_eq!(substeps.count_for(-30.0), 2);
    assert_eq!(SubstepConfig::tank().count_for(30.0), 4);
}

// Gears

#[test]
fn test_gear_sequence() {
    let gears = GearboxConfig::default();
    assert_eq!(gears.next_up(Gear::Reverse), Some(Gear::Neutral));
    assert_eq!(gears.next_up(Gear::Neutral), Some(Gear::FIRST));
    assert_eq!(gears.next_up(gears.top_gear()), None);
    assert_eq!(gears.next_down(Gear::FIRST), Some(Gear::Neutral));
    assert_eq!(gears.next_down(Gear::Reverse), None);

    assert_eq!(gears.ratio(Gear::Neutral), 0.0);
    assert_eq!(gears.ratio(Gear::Forward(2)), 2.0);
    assert_eq!(gears.ratio(Gear::Forward(9)), 0.0);
    assert!(gears.contains(Gear::Reverse));
    assert!(!gears.contains(Gear::Forward(6)));

    for index in 0..8 {
        assert_eq!(Gear::from_index(index).index(), index);
    }
}

// Suspension geometry

#[test]
fn test_camber_interpolates_over_travel() {
    let suspension = SuspensionConfig {
        camber_at_rest: 0.0,
        camber_at_max_compression: -0.1,
        camber_at_max_droop: 0.05,
        ..SuspensionConfig::default()
    };
    assert_eq!(suspension.camber_at(0.0), 0.0);
    assert_relative_eq!(suspension.camber_at(suspension.max_compression), -0.1, epsilon = 1e-6);
    assert_relative_eq!(suspension.camber_at(suspension.max_compression * 0.5), -0.05, epsilon = 1e-6);
    assert_relative_eq!(suspension.camber_at(-suspension.max_droop), 0.05, epsilon = 1e-6);
}

#[test]
fn test_load_filter_shape() {
    let filter = TireLoadFilter {
        min_normalized_load: 0.5,
        max_normalized_load: 2.5,
        max_filtered_normalized_load: 2.0,
    };
    assert_eq!(filter.filter(0.25), 0.0);
    assert_relative_eq!(filter.filter(1.5), 1.0, epsilon = 1e-6);
    assert_eq!(filter.filter(10.0), 2.0);
}

// Lookup and linear algebra

#[test]
fn test_lookup_table_interpolates() {
    let table = LookupTable::from_pairs(&[(0.0, 1.0), (10.0, 0.5), (30.0, 0.2)]);
    assert_eq!(table.evaluate(-5.0), 1.0);
    assert_relative_eq!(table.evaluate(5.0), 0.75, epsilon = 1e-6);
    assert_relative_eq!(table.evaluate(20.0), 0.35, epsilon = 1e-6);
    assert_eq!(table.evaluate(100.0), 0.2);
    assert_eq!(LookupTable::new().evaluate(3.0), 0.0);
}

#[test]
fn test_solve_square_with_pivoting() {
    // Zero leading entry forces a row swap
    let a = DMatrix::from_row_slice(3, 3, &[0.0, 2.0, 1.0, 1.0, 1.0, 0.0, 3.0, 0.0, 1.0]);
    let expected = DVector::from_vec(vec![1.0, -2.0, 3.0]);
    let b = &a * &expected;

    let x = solve_square(&a, &b);
    for i in 0..3 {
        assert_relative_eq!(x[i], expected[i], epsilon = 1e-5);
    }
}

#[test]
fn test_lu_uses_leading_block_of_non_square_matrix() {
    // Extra row and column are ignored
    let a = DMatrix::from_row_slice(3, 4, &[
        2.0, 1.0, 7.0, 7.0,
        1.0, 3.0, 7.0, 7.0,
        7.0, 7.0, 7.0, 7.0,
    ]);
    let lu = LuDecomposition::new(a);
    assert_eq!(lu.dim(), 3);

    let square = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
    let lu = LuDecomposition::new(square.clone().insert_row(2, 5.0));
    assert_eq!(lu.dim(), 2);
    let x = lu.solve(&DVector::from_vec(vec![3.0, 4.0]));
    assert_relative_eq!(x[0], 1.0, epsilon = 1e-5);
    assert_relative_eq!(x[1], 1.0, epsilon = 1e-5);
}

#[test]
fn test_singular_system_does_not_blow_up() {
    let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
    let b = DVector::from_vec(vec![0.0, 0.0]);
    let x = solve_square(&a, &b);
    assert!(x.iter().all(|v| v.is_finite()));
}

#[test]
fn test_least_squares_fits_line() {
    // y = 2x + 1 sampled without noise
    let xs = [0.0f32, 1.0, 2.0, 3.0, 4.0];
    let mut a = DMatrix::<f32>::zeros(xs.len(), 2);
    let mut b = DVector::<f32>::zeros(xs.len());
    for (i, x) in xs.iter().enumerate() {
        a[(i, 0)] = *x;
        a[(i, 1)] = 1.0;
        b[i] = 2.0 * x + 1.0;
    }

    let fit = solve_least_squares(&a, &b);
    assert_eq!(fit.len(), 2);
    assert_relative_eq!(fit[0], 2.0, epsilon = 1e-4);
    assert_relative_eq!(fit[1], 1.0, epsilon = 1e-4);
}

// Surfaces

#[test]
fn test_friction_pairs_and_surface_lookup() {
    let mut pairs = FrictionPairs::new(3, 2).unwrap();
    pairs.set_friction(SurfaceType(2), TireType(1), 0.3).unwrap();
    for id in 0..40 {
        pairs.set_material_surface(MaterialId(id), SurfaceType(id % 3)).unwrap();
    }
    pairs.set_material_surface(MaterialId(5), SurfaceType(0)).unwrap();

    assert_eq!(pairs.friction(SurfaceType(2), TireType(1)), 0.3);
    assert_eq!(pairs.friction(SurfaceType(2), TireType(0)), 1.0);
    assert_eq!(pairs.friction(SurfaceType(9), TireType(0)), 1.0);
    assert_eq!(pairs.materials().len(), 40);

    let lookup = SurfaceTypeLookup::new(&pairs);
    for id in 0..40 {
        let expected = if id == 5 { SurfaceType(0) } else { SurfaceType(id % 3) };
        assert_eq!(lookup.surface_type(MaterialId(id)), expected);
    }
    assert_eq!(lookup.surface_type(MaterialId(1000)), SurfaceType::DEFAULT);
}

#[test]
fn test_friction_table_errors() {
    assert!(matches!(
        FrictionPairs::new(0, 1),
        Err(VehicleError::InvalidFrictionTable(_))
    ));
    let mut pairs = FrictionPairs::new(2, 2).unwrap();
    assert!(pairs.set_friction(SurfaceType(0), TireType(0), -1.0).is_err());
    assert!(pairs.set_friction(SurfaceType(2), TireType(0), 1.0).is_err());
    assert!(pairs.set_material_surface(MaterialId(1), SurfaceType(5)).is_err());
}

// Sprung masses

#[test]
fn test_sprung_masses_of_symmetric_car() {
    let offsets = [
        Vector3::new(0.8, -0.35, 1.3),
        Vector3::new(-0.8, -0.35, 1.3),
        Vector3::new(0.8, -0.35, -1.3),
        Vector3::new(-0.8, -0.35, -1.3),
    ];
    let masses = compute_sprung_masses(&offsets, 1500.0, &Vector3::y(), &Vector3::z()).unwrap();
    for mass in masses {
        assert_relative_eq!(mass, 375.0, epsilon = 1e-2);
    }
}

#[test]
fn test_sprung_masses_balance_moments() {
    // Tricycle: one wheel 2 m ahead, two wheels 1 m behind
    let offsets = [
        Vector3::new(0.0, -0.3, 2.0),
        Vector3::new(0.8, -0.3, -1.0),
        Vector3::new(-0.8, -0.3, -1.0),
    ];
    let masses = compute_sprung_masses(&offsets, 900.0, &Vector3::y(), &Vector3::z()).unwrap();
    for mass in &masses {
        assert_relative_eq!(*mass, 300.0, epsilon = 1e-2);
    }

    let total: f32 = masses.iter().sum();
    let pitch: f32 = masses.iter().zip(&offsets).map(|(m, p)| m * p.z).sum();
    let roll: f32 = masses.iter().zip(&offsets).map(|(m, p)| m * p.x).sum();
    assert_relative_eq!(total, 900.0, epsilon = 1e-2);
    assert_relative_eq!(pitch, 0.0, epsilon = 1e-2);
    assert_relative_eq!(roll, 0.0, epsilon = 1e-2);
}

#[test]
fn test_sprung_masses_reject_outside_centre_of_mass() {
    // Both wheels ahead of the centre of mass
    let offsets = [Vector3::new(0.0, -0.3, 1.0), Vector3::new(0.0, -0.3, 2.0)];
    assert!(compute_sprung_masses(&offsets, 100.0, &Vector3::y(), &Vector3::z()).is_err());
    assert!(compute_sprung_masses(&[], 100.0, &Vector3::y(), &Vector3::z()).is_err());
    assert_eq!(
        compute_sprung_masses(&[Vector3::zeros()], 80.0, &Vector3::y(), &Vector3::z()).unwrap(),
        vec![80.0]
    );
}

// Input smoothing

#[test]
fn test_inputs_rise_and_fall_at_their_rates() {
    let smoothing = InputSmoothing::gamepad();
    let raw = DriveInputs4W {
        accel: 1.0,
        brake: 0.0,
        ..Default::default()
    };
    let current = DriveInputs4W {
        brake: 1.0,
        ..Default::default()
    };

    let next = smooth_inputs_4w(&raw, &current, &smoothing, &LookupTable::new(), 0.0, 0.1);
    assert_relative_eq!(next.accel, 0.6, epsilon = 1e-6);
    assert_relative_eq!(next.brake, 0.0);

    // Targets are never overshot
    let next = smooth_inputs_4w(&raw, &next, &smoothing, &LookupTable::new(), 0.0, 0.1);
    assert_eq!(next.accel, 1.0);
}

#[test]
fn test_steer_is_scaled_down_at_speed() {
    let smoothing = InputSmoothing::keyboard();
    let table = LookupTable::from_pairs(&[(0.0, 1.0), (30.0, 0.2)]);
    let raw = DriveInputs4W {
        steer_left: 1.0,
        ..Default::default()
    };
    let mut current = DriveInputs4W::default();

    for _ in 0..20 {
        current = smooth_inputs_4w(&raw, &current, &smoothing, &table, -30.0, 0.1);
    }
    assert_relative_eq!(current.steer_left, 0.2, epsilon = 1e-6);
    assert_relative_eq!(current.steer(), 0.2, epsilon = 1e-6);

    for _ in 0..20 {
        current = smooth_inputs_4w(&raw, &current, &smoothing, &table, 0.0, 0.1);
    }
    assert_relative_eq!(current.steer_left, 1.0);
}

// Reference collaborators

#[test]
fn test_plane_scene_returns_nearest_unfiltered_hit() {
    use phys_vehicle::{
        bodies::RigidBodyType,
        core::{ActorId, QueryFilter, SceneQuery, SuspensionRay},
        math::Point3,
        scene::{GroundPlane, PlaneScene},
    };

    let mut scene = PlaneScene::new();
    scene
        .add_plane(GroundPlane::horizontal(0.0, MaterialId(1)))
        .add_plane(
            GroundPlane::from_point_normal(Point3::new(0.0, 0.5, 0.0), Vector3::y(), MaterialId(2))
                .with_actor(ActorId(4), RigidBodyType::Dynamic),
        );
    let ray = SuspensionRay {
        origin: Point3::new(0.0, 2.0, 0.0),
        direction: -Vector3::y(),
        length: 3.0,
    };

    let hit = scene.raycast(&ray, &QueryFilter::default()).unwrap();
    assert_eq!(hit.material, MaterialId(2));
    assert_eq!(hit.actor, Some(ActorId(4)));
    assert_relative_eq!(hit.distance, 1.5, epsilon = 1e-6);

    let filter = QueryFilter {
        exclude_actor: Some(ActorId(4)),
        ..QueryFilter::default()
    };
    let hit = scene.raycast(&ray, &filter).unwrap();
    assert_eq!(hit.material, MaterialId(1));
    assert_relative_eq!(hit.point.y, 0.0, epsilon = 1e-6);

    // Too short, and pointing away from the planes
    let short = SuspensionRay { length: 1.0, ..ray };
    assert!(scene.raycast(&short, &QueryFilter::default()).is_none());
    let upward = SuspensionRay { direction: Vector3::y(), ..ray };
    assert!(scene.raycast(&upward, &QueryFilter::default()).is_none());
}

#[test]
fn test_simple_rigid_body_impulses() {
    use phys_vehicle::{
        bodies::{BodyFlags, RigidBodyType, SimpleRigidBody},
        math::{Point3, Transform},
        ChassisBody,
    };

    let mut body = SimpleRigidBody::new_box(10.0, Vector3::new(0.5, 0.5, 0.5), Transform::identity());
    assert_eq!(body.get_body_type(), RigidBodyType::Dynamic);

    body.apply_impulse(Vector3::new(0.0, 20.0, 0.0), Vector3::zeros());
    assert_relative_eq!(body.linear_velocity().y, 2.0);

    // An off-centre impulse also spins the body
    body.apply_impulse_at_point(Vector3::new(0.0, 0.0, 10.0), Point3::new(0.0, 1.0, 0.0));
    assert_relative_eq!(body.linear_velocity().z, 1.0);
    assert!(body.angular_velocity().x > 0.0);

    body.set_flags(BodyFlags::KINEMATIC);
    assert_eq!(body.get_body_type(), RigidBodyType::Kinematic);
    let before = body.linear_velocity();
    body.apply_impulse(Vector3::new(100.0, 0.0, 0.0), Vector3::zeros());
    body.integrate(0.1, Vector3::new(0.0, -9.81, 0.0));
    assert_eq!(body.linear_velocity(), before);
}

#[test]
fn test_simple_rigid_body_centre_of_mass_offset() {
    use phys_vehicle::{bodies::SimpleRigidBody, math::Transform, ChassisBody};

    let mut body = SimpleRigidBody::new(1.0, Vector3::new(1.0, 1.0, 1.0), Transform::identity())
        .with_center_of_mass(Vector3::new(0.0, -0.2, 0.0));
    body.set_damping(0.0, 0.0);
    body.set_linear_velocity(Vector3::new(1.0, 0.0, 0.0));

    assert_relative_eq!(body.get_center_of_mass_world().y, -0.2);
    body.integrate(0.5, Vector3::zeros());
    assert_relative_eq!(body.global_pose().translation.vector.x, 0.5, epsilon = 1e-6);
    assert_relative_eq!(body.center_of_mass_local().translation.vector.y, -0.2);
}
