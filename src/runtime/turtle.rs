//! Turtle movement and drawing instructions.

use std::f64::consts::PI;
use crate::config::{Value, TURTLE_BASE};
use crate::bytecode::OpCode;
use crate::runtime::{Machine, Host, Message, RuntimeErrorKind as RK, error::OpResult};
use crate::runtime::host::{Draw, Point, Turtle};
use crate::runtime::{colours, math::round};

/// Maximum number of points kept in the coordinate buffer.
const COORDS_MAX: usize = 1024;

/// Generates getters and setters for the turtle properties stored in global memory.
macro_rules! impl_turtle_properties {
    ( $( $name:ident = $slot:literal ),+ $(,)? ) => { paste::paste! {
        impl<H> Machine<H> where H: Host {
            $(
                pub(crate) fn [<turtle_ $name>](self: &Self) -> Value {
                    self.memory.cell(TURTLE_BASE + $slot)
                }
                pub(crate) fn [<set_turtle_ $name>](self: &mut Self, value: Value) {
                    self.memory.set_cell(TURTLE_BASE + $slot, value)
                }
            )+
        }
    } };
}

impl_turtle_properties!(x = 0, y = 1, direction = 2, angles = 3, thickness = 4, colour = 5);

impl<H> Machine<H> where H: Host {

    /// Current turtle state.
    pub(crate) fn turtle(self: &Self) -> Turtle {
        Turtle {
            x           : self.turtle_x(),
            y           : self.turtle_y(),
            direction   : self.turtle_direction(),
            angles      : self.turtle_angles(),
            thickness   : self.turtle_thickness(),
            colour      : self.turtle_colour(),
        }
    }

    fn position(self: &Self) -> Point {
        (self.turtle_x(), self.turtle_y())
    }

    fn send_turtle(self: &mut Self) {
        let turtle = self.turtle();
        self.host.send(Message::Turtle(turtle));
    }

    fn remember(self: &mut Self, point: Point) {
        if self.coords.len() == COORDS_MAX {
            self.coords.remove(0);
        }
        self.coords.push(point);
    }

    /// The last `count` remembered points.
    fn remembered(self: &Self, count: Value) -> Vec<Point> {
        let count = (count.max(0) as usize).min(self.coords.len());
        self.coords[self.coords.len() - count ..].to_vec()
    }

    /// Current direction in radians, clockwise from up.
    fn radians(self: &Self) -> f64 {
        self.turtle_direction() as f64 / self.turtle_angles() as f64 * 2.0 * PI
    }

    /// Converts radians to the current angle units.
    pub(crate) fn to_angle_units(self: &Self, radians: f64) -> f64 {
        radians / (2.0 * PI) * self.turtle_angles() as f64
    }

    /// Converts the current angle units to radians.
    pub(crate) fn from_angle_units(self: &Self, angle: f64) -> f64 {
        angle / self.turtle_angles() as f64 * 2.0 * PI
    }

    fn set_direction(self: &mut Self, direction: Value) {
        let angles = self.turtle_angles();
        self.set_turtle_direction(if angles != 0 { direction.rem_euclid(angles) } else { direction });
    }

    /// Changes the angle units, rescaling the direction.
    fn set_angles(self: &mut Self, angles: Value) -> OpResult {
        if angles == 0 {
            return Err(RK::AngleZero);
        }
        let previous = self.turtle_angles();
        if previous != 0 {
            let direction = self.turtle_direction() as f64 * angles as f64 / previous as f64;
            self.set_turtle_direction(round(direction)?);
        }
        self.set_turtle_angles(angles);
        self.set_direction(self.turtle_direction());
        Ok(())
    }

    /// Writes a turtle property by slot (`stvt`).
    pub(crate) fn store_turtle(self: &mut Self, slot: Value, value: Value) -> OpResult {
        match slot {
            0 => self.set_turtle_x(value),
            1 => self.set_turtle_y(value),
            2 => self.set_direction(value),
            3 => self.set_angles(value)?,
            4 => self.set_turtle_thickness(value),
            5 => self.set_turtle_colour(value),
            _ => return Err(RK::InvalidAddress(slot)),
        }
        self.send_turtle();
        Ok(())
    }

    /// Reads a turtle property by slot (`ldvt`).
    pub(crate) fn load_turtle(self: &Self, slot: Value) -> OpResult<Value> {
        match slot {
            0 ..= 5 => Ok(self.memory.cell(TURTLE_BASE + slot as usize)),
            _ => Err(RK::InvalidAddress(slot)),
        }
    }

    /// Moves the turtle, drawing a line with the current pen if `draw` is set.
    fn move_to(self: &mut Self, to: Point, draw: bool) {
        let from = self.position();
        self.set_turtle_x(to.0);
        self.set_turtle_y(to.1);
        if draw && self.turtle_thickness() > 0 {
            let (colour, thickness) = (self.turtle_colour(), self.turtle_thickness());
            self.draw(Draw::Line { from, to, colour, thickness });
        }
        self.remember(to);
        self.send_turtle();
    }

    fn forward(self: &mut Self, distance: Value) -> OpResult {
        let radians = self.radians();
        let (x, y) = self.position();
        let to = (
            x.wrapping_add(round(distance as f64 * radians.sin())?),
            y.wrapping_sub(round(distance as f64 * radians.cos())?),
        );
        self.move_to(to, true);
        Ok(())
    }

    fn arc(self: &mut Self, x_radius: Value, y_radius: Value, fill: bool) {
        let centre = self.position();
        let (colour, thickness) = (self.turtle_colour(), self.turtle_thickness());
        self.draw(Draw::Arc { centre, x_radius, y_radius, colour, thickness, fill });
    }

    fn polygon(self: &mut Self, count: Value, closed: bool, fill: bool) {
        let points = self.remembered(count);
        let (colour, thickness) = (self.turtle_colour(), self.turtle_thickness());
        self.draw(Draw::Polygon { points, colour, thickness, closed, fill });
    }

    /// Executes a turtle movement or drawing instruction.
    pub(crate) fn exec_turtle(self: &mut Self, opcode: OpCode) -> OpResult {
        use OpCode::*;
        match opcode {
            home => {
                let centre = (self.canvas.x + self.canvas.width / 2, self.canvas.y + self.canvas.height / 2);
                self.set_turtle_direction(0);
                self.move_to(centre, false);
            }
            setx => {
                let x = self.pop()?;
                self.move_to((x, self.turtle_y()), false);
            }
            sety => {
                let y = self.pop()?;
                self.move_to((self.turtle_x(), y), false);
            }
            setd => {
                let direction = self.pop()?;
                self.store_turtle(2, direction)?;
            }
            angl => {
                let angles = self.pop()?;
                self.store_turtle(3, angles)?;
            }
            thik => {
                let thickness = self.pop()?;
                self.store_turtle(4, thickness)?;
            }
            colr => {
                let colour = self.pop()?;
                self.store_turtle(5, colour)?;
            }
            toxy => {
                let [ x, y ] = self.pop_n()?;
                self.move_to((x, y), false);
            }
            mvxy | drxy => {
                let [ dx, dy ] = self.pop_n()?;
                let (x, y) = self.position();
                self.move_to((x.wrapping_add(dx), y.wrapping_add(dy)), opcode == drxy);
            }
            fwrd => {
                let distance = self.pop()?;
                self.forward(distance)?;
            }
            back => {
                let distance = self.pop()?;
                self.forward(distance.wrapping_neg())?;
            }
            left | rght => {
                let amount = self.pop()?;
                let amount = if opcode == left { amount.wrapping_neg() } else { amount };
                self.set_direction(self.turtle_direction().wrapping_add(amount));
                self.send_turtle();
            }
            turn => {
                let [ x, y ] = self.pop_n()?;
                let (tx, ty) = self.position();
                let radians = (x.wrapping_sub(tx) as f64).atan2(ty.wrapping_sub(y) as f64);
                let direction = round(self.to_angle_units(radians))?;
                self.set_direction(direction);
                self.send_turtle();
            }
            blnk => {
                let colour = self.pop()?;
                self.draw(Draw::Blank { colour });
            }
            fill => {
                let [ colour, boundary ] = self.pop_n()?;
                let at = self.position();
                self.draw(Draw::Fill { at, colour, boundary });
            }
            pixs => {
                let [ x, y, colour ] = self.pop_n()?;
                self.draw(Draw::Pixel { at: (x, y), colour });
            }
            rgb => {
                let index = self.pop()?;
                self.push(colours::palette(index))?;
            }
            mixc => {
                let [ first, second, first_weight, second_weight ] = self.pop_n()?;
                self.push(colours::mix(first, second, first_weight, second_weight)?)?;
            }
            rmbr => {
                let point = self.position();
                self.remember(point);
            }
            frgt => {
                let count = (self.pop()?.max(0) as usize).min(self.coords.len());
                self.coords.truncate(self.coords.len() - count);
            }
            plin => {
                let count = self.pop()?;
                self.polygon(count, false, false);
            }
            poly => {
                let count = self.pop()?;
                self.polygon(count, true, false);
            }
            pfil => {
                let count = self.pop()?;
                self.polygon(count, true, true);
            }
            circ | blot => {
                let radius = self.pop()?;
                self.arc(radius, radius, opcode == blot);
            }
            elps | eblt => {
                let [ x_radius, y_radius ] = self.pop_n()?;
                self.arc(x_radius, y_radius, opcode == eblt);
            }
            rbox => {
                let [ width, height, colour, border ] = self.pop_n()?;
                let corner = self.position();
                let border = if border != 0 { Some(self.turtle_colour()) } else { None };
                let thickness = self.turtle_thickness();
                self.draw(Draw::Box { corner, width, height, colour, border, thickness });
            }
            text => {
                let pointer = self.pop()?;
                let string = self.memory.text(pointer)?;
                let (at, colour) = (self.position(), self.turtle_colour());
                let (family, size) = self.font;
                self.draw(Draw::Text { at, text: string, colour, font: family, size });
            }
            _ => return Err(RK::InvalidOpCode(opcode as Value)),
        }
        Ok(())
    }
}
