use phys_vehicle::{
    bodies::SimpleRigidBody,
    components::{AutoboxConfig, Gear},
    core::{ActorId, NoContactReaction, VehicleTuningContext, WheelPoses},
    math::{Transform, Vector3},
    scene::{GroundPlane, PlaneScene},
    surface::{FrictionPairs, MaterialId},
    vehicle::{
        batch::{self, StepContext, VehicleEntry},
        DriveDesc, DriveInputs, DriveInputs4W, Vehicle, VehicleDesc,
    },
    ChassisBody,
};
use std::io::{stdout, Write};
use std::thread::sleep;
use std::time::{Duration, Instant};
use crossterm::{
    ExecutableCommand, QueueableCommand,
    terminal::{Clear, ClearType, size},
    cursor::{Hide, Show, MoveTo},
    style::{Color, Print, SetForegroundColor, ResetColor},
};
use nalgebra::{Translation3, UnitQuaternion};

const FRAME_DURATION: Duration = Duration::from_millis(16); // ~60 FPS
const STEP: f32 = 1.0 / 60.0;
const TRACK_LENGTH: f32 = 400.0; // metres
const CHASSIS_MASS: f32 = 1500.0;

// Shift up once the engine passes this fraction of its maximum speed
const MANUAL_SHIFT_POINT: f32 = 0.85;

struct Lane {
    name: &'static str,
    color: Color,
    vehicle: Vehicle,
    chassis: SimpleRigidBody,
    poses: WheelPoses,
    manual: bool,
    finish_time: Option<f32>,
}

impl Lane {
    fn new(name: &'static str, color: Color, x: f32, id: u32, autobox: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let mut desc = VehicleDesc::sedan(CHASSIS_MASS)?;
        if autobox {
            if let DriveDesc::FourWheel { drive, .. } = &mut desc.drive {
                drive.autobox = Some(AutoboxConfig::for_gears(drive.gears.forward_count()));
            }
        }
        let mut vehicle = Vehicle::new(desc)?;
        vehicle.force_gear(Gear::FIRST)?;
        vehicle.set_inputs(DriveInputs::FourWheel(DriveInputs4W {
            accel: 1.0,
            ..Default::default()
        }))?;

        let pose = Transform::from_parts(Translation3::new(x, 0.65, 0.0), UnitQuaternion::identity());
        let chassis = SimpleRigidBody::new_box(CHASSIS_MASS, Vector3::new(1.0, 0.5, 2.3), pose)
            .with_id(ActorId(id));

        Ok(Self {
            name,
            color,
            vehicle,
            chassis,
            poses: WheelPoses::default(),
            manual: !autobox,
            finish_time: None,
        })
    }

    fn distance(&self) -> f32 {
        self.chassis.global_pose().translation.vector.z
    }

    fn speed_kmh(&self) -> f32 {
        self.chassis.linear_velocity().z * 3.6
    }

    /// Driver logic for the manual car: shift at the shift point, never mid-shift
    fn drive(&mut self) {
        if !self.manual || self.vehicle.gearbox().is_shifting() {
            return;
        }
        let max_omega = self
            .vehicle
            .drive()
            .engine_drive()
            .map_or(1.0, |d| d.engine.max_omega);
        if self.vehicle.engine_omega() / max_omega > MANUAL_SHIFT_POINT {
            self.vehicle.request_gear_up();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize terminal
    let mut stdout = stdout();
    stdout.execute(Hide)?;
    let (width, _height) = size()?;

    let mut scene = PlaneScene::new();
    scene.add_plane(GroundPlane::horizontal(0.0, MaterialId(0)));
    let tuning = VehicleTuningContext::default();
    let pairs = FrictionPairs::default();
    let gravity = Vector3::new(0.0, -9.81, 0.0);

    let mut lanes = vec![
        Lane::new("manual ", Color::Red, 0.0, 1, false)?,
        Lane::new("autobox", Color::Cyan, 4.0, 2, true)?,
    ];

    let ctx = StepContext {
        tuning: &tuning,
        friction_pairs: &pairs,
        gravity,
        dt: STEP,
    };

    stdout.execute(Clear(ClearType::All))?;

    let track_columns = width.saturating_sub(12).max(10);
    let mut time = 0.0f32;
    let mut frame_time = Instant::now();

    while lanes.iter().any(|lane| lane.finish_time.is_none()) && time < 60.0 {
        for lane in &mut lanes {
            lane.drive();
        }

        {
            let mut entries: Vec<_> = lanes
                .iter_mut()
                .map(|lane| VehicleEntry::new(&mut lane.vehicle, &mut lane.chassis, &mut lane.poses))
                .collect();
            batch::suspension_raycasts(&scene, &mut entries);
            batch::update_vehicles(&ctx, &mut entries, &mut NoContactReaction);
        }
        time += STEP;

        for lane in &mut lanes {
            lane.chassis.integrate(STEP, gravity);
            if lane.finish_time.is_none() && lane.distance() >= TRACK_LENGTH {
                lane.finish_time = Some(time);
            }
        }

        // Draw lanes
        for (row, lane) in lanes.iter().enumerate() {
            let y = (row * 3) as u16 + 1;
            let progress = (lane.distance() / TRACK_LENGTH).clamp(0.0, 1.0);
            let column = (progress * track_columns as f32) as u16;

            stdout.queue(MoveTo(0, y))?
                  .queue(Clear(ClearType::CurrentLine))?
                  .queue(Print(lane.name))?
                  .queue(Print(" |"))?
                  .queue(MoveTo(10 + column, y))?
                  .queue(SetForegroundColor(lane.color))?
                  .queue(Print("▶"))?
                  .queue(ResetColor)?
                  .queue(MoveTo(10 + track_columns, y))?
                  .queue(Print("|"))?;

            let status = match lane.finish_time {
                Some(t) => format!("finished in {:.2} s", t),
                None => format!(
                    "{:6.1} km/h  gear {}  engine {:5.0} rad/s",
                    lane.speed_kmh(),
                    lane.vehicle.current_gear(),
                    lane.vehicle.engine_omega()
                ),
            };
            stdout.queue(MoveTo(0, y + 1))?
                  .queue(Clear(ClearType::CurrentLine))?
                  .queue(Print(status))?;
        }
        stdout.flush()?;

        // Timing control
        let elapsed = frame_time.elapsed();
        if elapsed < FRAME_DURATION {
            sleep(FRAME_DURATION - elapsed);
        }
        frame_time = Instant::now();
    }

    // Clean up
    stdout.execute(Show)?;
    stdout.execute(MoveTo(0, (lanes.len() * 3) as u16 + 2))?;
    for lane in &lanes {
        match lane.finish_time {
            Some(t) => println!("{}: {:.2} s over {} m", lane.name.trim(), t, TRACK_LENGTH),
            None => println!("{}: did not finish", lane.name.trim()),
        }
    }

    Ok(())
}
