//! Expression graph for per-fragment shading fields.
//!
//! A [`Node`] tree is built once and evaluated many times against an
//! [`EvalContext`]. Values broadcast like shader vectors: an operation between
//! a scalar and a vector applies the scalar to every component.

use std::fmt;
use std::ops;

use glam::Vec3;
use hazeframe_common::Color;
use hazeframe_common::math::{
    mix as mix_scalar, saturate as saturate_scalar, smoothstep as smoothstep_scalar,
};

use crate::noise::tri_noise_3d;

/// Per-fragment inputs to a field evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalContext {
    pub world_position: Vec3,
    /// Signed view-space z; negative in front of the camera.
    pub view_z: f32,
    /// Unit direction from the eye through the fragment.
    pub view_direction: Vec3,
    /// Current value of the time uniform.
    pub time: f32,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            world_position: Vec3::ZERO,
            view_z: 0.0,
            view_direction: Vec3::NEG_Z,
            time: 0.0,
        }
    }
}

impl EvalContext {
    pub fn at_time(time: f32) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    pub fn with_world_position(mut self, world_position: Vec3) -> Self {
        self.world_position = world_position;
        self
    }

    pub fn with_view_z(mut self, view_z: f32) -> Self {
        self.view_z = view_z;
        self
    }

    pub fn with_view_direction(mut self, view_direction: Vec3) -> Self {
        self.view_direction = view_direction;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    Vector,
}

/// Result of evaluating a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Scalar(f32),
    Vector(Vec3),
}

impl Value {
    pub fn kind(self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Vector(_) => ValueKind::Vector,
        }
    }

    /// Scalars pass through; vectors yield their x component.
    pub fn as_scalar(self) -> f32 {
        match self {
            Value::Scalar(s) => s,
            Value::Vector(v) => v.x,
        }
    }

    /// Vectors pass through; scalars are splatted.
    pub fn as_vec3(self) -> Vec3 {
        match self {
            Value::Scalar(s) => Vec3::splat(s),
            Value::Vector(v) => v,
        }
    }

    fn map(self, f: impl Fn(f32) -> f32) -> Value {
        match self {
            Value::Scalar(s) => Value::Scalar(f(s)),
            Value::Vector(v) => Value::Vector(Vec3::new(f(v.x), f(v.y), f(v.z))),
        }
    }

    fn zip(self, other: Value, f: impl Fn(f32, f32) -> f32) -> Value {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(f(a, b)),
            (a, b) => {
                let (a, b) = (a.as_vec3(), b.as_vec3());
                Value::Vector(Vec3::new(f(a.x, b.x), f(a.y, b.y), f(a.z, b.z)))
            }
        }
    }

    fn zip3(a: Value, b: Value, c: Value, f: impl Fn(f32, f32, f32) -> f32) -> Value {
        match (a, b, c) {
            (Value::Scalar(a), Value::Scalar(b), Value::Scalar(c)) => Value::Scalar(f(a, b, c)),
            (a, b, c) => {
                let (a, b, c) = (a.as_vec3(), b.as_vec3(), c.as_vec3());
                Value::Vector(Vec3::new(
                    f(a.x, b.x, c.x),
                    f(a.y, b.y, c.y),
                    f(a.z, b.z, c.z),
                ))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Max,
    Min,
}

impl BinaryOp {
    fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
            BinaryOp::Max => a.max(b),
            BinaryOp::Min => a.min(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    OneMinus,
    Saturate,
}

impl UnaryOp {
    fn apply(self, x: f32) -> f32 {
        match self {
            UnaryOp::Negate => -x,
            UnaryOp::OneMinus => 1.0 - x,
            UnaryOp::Saturate => saturate_scalar(x),
        }
    }
}

/// A node in a shading expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(Value),
    WorldPosition,
    ViewZ,
    ViewDirection,
    Time,
    Noise {
        position: Box<Node>,
        speed: Box<Node>,
        time: Box<Node>,
    },
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Unary(UnaryOp, Box<Node>),
    Smoothstep {
        edge0: Box<Node>,
        edge1: Box<Node>,
        x: Box<Node>,
    },
    Mix {
        a: Box<Node>,
        b: Box<Node>,
        t: Box<Node>,
    },
    Component(Box<Node>, Axis),
}

/// Scalar constant.
pub fn float(v: f32) -> Node {
    Node::Constant(Value::Scalar(v))
}

/// Vector constant.
pub fn vec3(v: Vec3) -> Node {
    Node::Constant(Value::Vector(v))
}

/// Color constant, stored as an RGB vector.
pub fn color(c: Color) -> Node {
    vec3(c.to_vec3())
}

/// `a * (1 - t) + b * t`, componentwise.
pub fn mix(a: impl Into<Node>, b: impl Into<Node>, t: impl Into<Node>) -> Node {
    Node::Mix {
        a: Box::new(a.into()),
        b: Box::new(b.into()),
        t: Box::new(t.into()),
    }
}

/// Hermite ramp of `x` between `edge0` and `edge1`.
pub fn smoothstep(edge0: impl Into<Node>, edge1: impl Into<Node>, x: impl Into<Node>) -> Node {
    Node::Smoothstep {
        edge0: Box::new(edge0.into()),
        edge1: Box::new(edge1.into()),
        x: Box::new(x.into()),
    }
}

/// Triangle noise sample at `position`, animated by `time * speed`.
pub fn tri_noise(position: impl Into<Node>, speed: impl Into<Node>, time: impl Into<Node>) -> Node {
    Node::Noise {
        position: Box::new(position.into()),
        speed: Box::new(speed.into()),
        time: Box::new(time.into()),
    }
}

impl From<f32> for Node {
    fn from(v: f32) -> Self {
        float(v)
    }
}

impl From<Vec3> for Node {
    fn from(v: Vec3) -> Self {
        vec3(v)
    }
}

impl From<Color> for Node {
    fn from(c: Color) -> Self {
        color(c)
    }
}

impl Node {
    fn binary(self, op: BinaryOp, rhs: impl Into<Node>) -> Node {
        Node::Binary(op, Box::new(self), Box::new(rhs.into()))
    }

    fn unary(self, op: UnaryOp) -> Node {
        Node::Unary(op, Box::new(self))
    }

    pub fn pow(self, exponent: impl Into<Node>) -> Node {
        self.binary(BinaryOp::Pow, exponent)
    }

    pub fn max(self, other: impl Into<Node>) -> Node {
        self.binary(BinaryOp::Max, other)
    }

    pub fn min(self, other: impl Into<Node>) -> Node {
        self.binary(BinaryOp::Min, other)
    }

    pub fn saturate(self) -> Node {
        self.unary(UnaryOp::Saturate)
    }

    pub fn one_minus(self) -> Node {
        self.unary(UnaryOp::OneMinus)
    }

    pub fn component(self, axis: Axis) -> Node {
        Node::Component(Box::new(self), axis)
    }

    pub fn y(self) -> Node {
        self.component(Axis::Y)
    }

    /// Output shape, inferred without evaluating.
    pub fn kind(&self) -> ValueKind {
        match self {
            Node::Constant(v) => v.kind(),
            Node::WorldPosition | Node::ViewDirection => ValueKind::Vector,
            Node::ViewZ | Node::Time | Node::Noise { .. } | Node::Component(..) => {
                ValueKind::Scalar
            }
            Node::Unary(_, x) => x.kind(),
            Node::Binary(_, a, b) => widest([a.kind(), b.kind()]),
            Node::Smoothstep { edge0, edge1, x } => {
                widest([edge0.kind(), edge1.kind(), x.kind()])
            }
            Node::Mix { a, b, t } => widest([a.kind(), b.kind(), t.kind()]),
        }
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Node::Constant(_)
            | Node::WorldPosition
            | Node::ViewZ
            | Node::ViewDirection
            | Node::Time => 0,
            Node::Unary(_, x) | Node::Component(x, _) => x.node_count(),
            Node::Binary(_, a, b) => a.node_count() + b.node_count(),
            Node::Noise {
                position,
                speed,
                time,
            } => position.node_count() + speed.node_count() + time.node_count(),
            Node::Smoothstep { edge0, edge1, x } => {
                edge0.node_count() + edge1.node_count() + x.node_count()
            }
            Node::Mix { a, b, t } => a.node_count() + b.node_count() + t.node_count(),
        }
    }

    pub fn evaluate(&self, ctx: &EvalContext) -> Value {
        match self {
            Node::Constant(v) => *v,
            Node::WorldPosition => Value::Vector(ctx.world_position),
            Node::ViewZ => Value::Scalar(ctx.view_z),
            Node::ViewDirection => Value::Vector(ctx.view_direction),
            Node::Time => Value::Scalar(ctx.time),
            Node::Noise {
                position,
                speed,
                time,
            } => Value::Scalar(tri_noise_3d(
                position.evaluate(ctx).as_vec3(),
                speed.evaluate(ctx).as_scalar(),
                time.evaluate(ctx).as_scalar(),
            )),
            Node::Binary(op, a, b) => a.evaluate(ctx).zip(b.evaluate(ctx), |x, y| op.apply(x, y)),
            Node::Unary(op, x) => x.evaluate(ctx).map(|v| op.apply(v)),
            Node::Smoothstep { edge0, edge1, x } => Value::zip3(
                edge0.evaluate(ctx),
                edge1.evaluate(ctx),
                x.evaluate(ctx),
                smoothstep_scalar,
            ),
            Node::Mix { a, b, t } => Value::zip3(
                a.evaluate(ctx),
                b.evaluate(ctx),
                t.evaluate(ctx),
                mix_scalar,
            ),
            Node::Component(x, axis) => {
                let v = x.evaluate(ctx).as_vec3();
                Value::Scalar(match axis {
                    Axis::X => v.x,
                    Axis::Y => v.y,
                    Axis::Z => v.z,
                })
            }
        }
    }
}

fn widest<const N: usize>(kinds: [ValueKind; N]) -> ValueKind {
    if kinds.contains(&ValueKind::Vector) {
        ValueKind::Vector
    } else {
        ValueKind::Scalar
    }
}

impl<T: Into<Node>> ops::Add<T> for Node {
    type Output = Node;

    fn add(self, rhs: T) -> Node {
        self.binary(BinaryOp::Add, rhs)
    }
}

impl<T: Into<Node>> ops::Sub<T> for Node {
    type Output = Node;

    fn sub(self, rhs: T) -> Node {
        self.binary(BinaryOp::Sub, rhs)
    }
}

impl<T: Into<Node>> ops::Mul<T> for Node {
    type Output = Node;

    fn mul(self, rhs: T) -> Node {
        self.binary(BinaryOp::Mul, rhs)
    }
}

impl<T: Into<Node>> ops::Div<T> for Node {
    type Output = Node;

    fn div(self, rhs: T) -> Node {
        self.binary(BinaryOp::Div, rhs)
    }
}

impl ops::Neg for Node {
    type Output = Node;

    fn neg(self) -> Node {
        self.unary(UnaryOp::Negate)
    }
}

/// Renders the tree as a WGSL-flavoured expression.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Constant(Value::Scalar(s)) => write!(f, "{s:?}"),
            Node::Constant(Value::Vector(v)) => write!(f, "vec3({:?}, {:?}, {:?})", v.x, v.y, v.z),
            Node::WorldPosition => f.write_str("position_world"),
            Node::ViewZ => f.write_str("position_view.z"),
            Node::ViewDirection => f.write_str("view_dir"),
            Node::Time => f.write_str("time"),
            Node::Noise {
                position,
                speed,
                time,
            } => write!(f, "tri_noise_3d({position}, {speed}, {time})"),
            Node::Binary(op, a, b) => match op {
                BinaryOp::Add => write!(f, "({a} + {b})"),
                BinaryOp::Sub => write!(f, "({a} - {b})"),
                BinaryOp::Mul => write!(f, "({a} * {b})"),
                BinaryOp::Div => write!(f, "({a} / {b})"),
                BinaryOp::Pow => write!(f, "pow({a}, {b})"),
                BinaryOp::Max => write!(f, "max({a}, {b})"),
                BinaryOp::Min => write!(f, "min({a}, {b})"),
            },
            Node::Unary(op, x) => match op {
                UnaryOp::Negate => write!(f, "-{x}"),
                UnaryOp::OneMinus => write!(f, "(1.0 - {x})"),
                UnaryOp::Saturate => write!(f, "saturate({x})"),
            },
            Node::Smoothstep { edge0, edge1, x } => write!(f, "smoothstep({edge0}, {edge1}, {x})"),
            Node::Mix { a, b, t } => write!(f, "mix({a}, {b}, {t})"),
            Node::Component(x, axis) => {
                let suffix = match axis {
                    Axis::X => "x",
                    Axis::Y => "y",
                    Axis::Z => "z",
                };
                write!(f, "{x}.{suffix}")
            }
        }
    }
}
