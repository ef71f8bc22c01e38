use serde::{Deserialize, Serialize};

use crate::vector::Vector3;

/// A point cloud stored in single precision.
///
/// `points` hold *local* coordinates. The matching global coordinate of a
/// point is `local / global_scale - global_shift`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<[f32; 3]>,
    pub global_shift: Vector3,
    pub global_scale: f64,
}

impl PointCloud {
    /// An empty cloud with no shift and unit scale.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            global_shift: Vector3::zero(),
            global_scale: 1.0,
        }
    }

    /// An empty cloud carrying the given global shift.
    pub fn with_shift(global_shift: Vector3) -> Self {
        Self {
            global_shift,
            ..Self::new()
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the cloud has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Store a global coordinate, applying the cloud's shift and scale.
    pub fn push_global(&mut self, global: Vector3) {
        let local = (global + self.global_shift).map(|c| c * self.global_scale);
        self.points
            .push([local.x as f32, local.y as f32, local.z as f32]);
    }

    /// Global coordinate of the point at `index`.
    pub fn global_point(&self, index: usize) -> Option<Vector3> {
        self.points.get(index).map(|p| {
            let local = Vector3::new(p[0] as f64, p[1] as f64, p[2] as f64);
            local.map(|c| c / self.global_scale) - self.global_shift
        })
    }

    /// Returns `true` if a non-trivial shift or scale is attached.
    pub fn is_shifted(&self) -> bool {
        !self.global_shift.is_zero() || self.global_scale != 1.0
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

/// What an [`Entity`] carries besides its children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// A pure container.
    Group,
    PointCloud(PointCloud),
}

/// Named node of a loaded entity tree.
///
/// A load operation fills an empty root `Entity` with children. The root is
/// discarded by the dispatcher when it ends up without children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    name: String,
    kind: EntityKind,
    #[serde(default)]
    children: Vec<Entity>,
}

impl Entity {
    /// Create an empty group.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Group,
            children: Vec::new(),
        }
    }

    /// Create a point cloud leaf.
    pub fn point_cloud(name: impl Into<String>, cloud: PointCloud) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::PointCloud(cloud),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// The point cloud payload, if this entity is a cloud.
    pub fn as_point_cloud(&self) -> Option<&PointCloud> {
        match &self.kind {
            EntityKind::PointCloud(cloud) => Some(cloud),
            EntityKind::Group => None,
        }
    }

    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Entity] {
        &mut self.children
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Append a child.
    pub fn add_child(&mut self, child: Entity) {
        self.children.push(child);
    }

    /// Drop every child.
    pub fn remove_all_children(&mut self) {
        self.children.clear();
    }

    /// Depth-first iterator over this entity and all of its descendants.
    pub fn descendants(&self) -> impl Iterator<Item = &Entity> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Total number of points across this entity and its descendants.
    pub fn point_count(&self) -> usize {
        self.descendants()
            .filter_map(Entity::as_point_cloud)
            .map(PointCloud::len)
            .sum()
    }
}
