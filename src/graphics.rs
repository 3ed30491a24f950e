use macroquad::prelude::*;
use tracing::info;

use robosim::SimLink;
use robosim::config::TeleopConfig;
use robosim::geometry::{Bounds, Obstacle};

// Function to configure the macroquad window
pub fn window_conf() -> Conf {
    Conf {
        window_title: "robosim".to_string(),
        window_width: 800,
        window_height: 600,
        high_dpi: true,
        ..Default::default()
    }
}

/// Fraction of the window used by the scene.
const VIS_MARGIN: f32 = 0.9;
const TEXT_SIZE: f32 = 20.0;

/// World-to-screen transform fitted to the scene bounds.
struct View {
    scale: f32,
    center_x: f32,
    center_y: f32,
}

impl View {
    fn fit(bounds: &Bounds) -> Self {
        let size = bounds.size();
        let center = bounds.center();
        let scale_x = screen_width() / size.x.max(1e-3) as f32;
        let scale_y = screen_height() / size.y.max(1e-3) as f32;
        View {
            scale: VIS_MARGIN * scale_x.min(scale_y),
            center_x: center.x as f32,
            center_y: center.y as f32,
        }
    }

    fn to_screen(&self, x: f64, y: f64) -> (f32, f32) {
        (
            screen_width() / 2.0 + (x as f32 - self.center_x) * self.scale,
            screen_height() / 2.0 - (y as f32 - self.center_y) * self.scale,
        )
    }
}

/// Arrow keys drive the robot; nothing held means stop.
fn teleop_command(teleop: &TeleopConfig) -> (f64, f64) {
    let mut linear = 0.0;
    let mut angular = 0.0;
    if is_key_down(KeyCode::Up) {
        linear += teleop.linear_speed;
    }
    if is_key_down(KeyCode::Down) {
        linear -= teleop.linear_speed;
    }
    if is_key_down(KeyCode::Left) {
        angular += teleop.angular_speed;
    }
    if is_key_down(KeyCode::Right) {
        angular -= teleop.angular_speed;
    }
    (linear, angular)
}

/// Draws the scene, the true pose and the latest scan until Escape is pressed.
///
/// Space stops the simulation; the window keeps showing the final state.
pub async fn run_visualization_loop(
    link: SimLink,
    obstacles: &[Obstacle],
    robot_length: f64,
    teleop: &TeleopConfig,
) {
    let Some(bounds) = Bounds::of_obstacles(obstacles) else {
        return;
    };
    let mut last_command = (0.0, 0.0);

    info!("Visualization loop starting inside graphics module...");

    loop {
        if is_key_pressed(KeyCode::Escape) {
            info!("Escape pressed. Closing visualization.");
            break;
        }
        if is_key_pressed(KeyCode::Space) && link.is_running() {
            info!("Space pressed. Stopping simulation.");
            link.request_stop();
        }

        let command = teleop_command(teleop);
        if command != last_command {
            link.send_control(command.0, command.1);
            last_command = command;
        }

        let view = View::fit(&bounds);
        clear_background(LIGHTGRAY);

        for obstacle in obstacles {
            match obstacle {
                Obstacle::Segment(segment) => {
                    let (x1, y1) = view.to_screen(segment.p1().x, segment.p1().y);
                    let (x2, y2) = view.to_screen(segment.p2().x, segment.p2().y);
                    draw_line(x1, y1, x2, y2, 2.0, BLACK);
                }
            }
        }

        let pose = link.ground_truth().pose;
        let heading = pose.heading();
        let sensor = pose.position() - heading.scale(0.5 * robot_length);
        let scan = link.laser_scan();
        for point in scan.points(sensor, pose.theta) {
            let (x, y) = view.to_screen(point.x, point.y);
            draw_circle(x, y, 2.0, RED);
        }

        let (rx, ry) = view.to_screen(pose.x, pose.y);
        let nose = pose.position() + heading.scale(robot_length);
        let (nx, ny) = view.to_screen(nose.x, nose.y);
        let color = if link.is_running() { BLUE } else { MAROON };
        draw_circle_lines(rx, ry, robot_length as f32 * view.scale, 2.0, color);
        draw_line(rx, ry, nx, ny, 2.0, DARKBLUE);

        let control = link.current_control();
        draw_text(
            &format!("Robot: x={:.2} y={:.2} th={:.2}", pose.x, pose.y, pose.theta),
            10.0,
            20.0,
            TEXT_SIZE,
            BLACK,
        );
        draw_text(
            &format!("Control: v={:.2} w={:.2}", control.v, control.omega),
            10.0,
            40.0,
            TEXT_SIZE,
            BLACK,
        );
        draw_text(
            &format!("Laser: {} valid beams", scan.valid_count()),
            10.0,
            60.0,
            TEXT_SIZE,
            BLACK,
        );
        if !link.is_running() {
            draw_text("Simulation stopped", 10.0, 80.0, TEXT_SIZE, MAROON);
        }

        next_frame().await
    }
}
