/*
This code is part of the viewfinder geospatial analysis library.
Authors: adapted from the WhiteboxTools geospatial analysis library.
License: MIT
*/

use super::{BoundingBox, LineSegment, Point2D};
use std::ops::Index;

/// A single polyline feature: an ordered sequence of vertices sharing one CRS.
#[derive(Clone, Debug)]
pub struct Polyline {
    pub vertices: Vec<Point2D>,
    pub id: usize,
}

impl Index<usize> for Polyline {
    type Output = Point2D;

    fn index<'a>(&'a self, index: usize) -> &'a Point2D {
        &self.vertices[index]
    }
}

impl Polyline {
    /// Creates a new Polyline from vertices. Panics if fewer than two vertices are supplied;
    /// callers that can't guarantee this should validate before construction.
    pub fn new(vertices: &[Point2D], id: usize) -> Polyline {
        assert!(vertices.len() >= 2, "a polyline requires at least two vertices");
        Polyline { vertices: vertices.to_vec(), id }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn num_segments(&self) -> usize {
        if self.vertices.len() < 2 {
            0
        } else {
            self.vertices.len() - 1
        }
    }

    pub fn segment(&self, index: usize) -> LineSegment {
        LineSegment::new(self.vertices[index], self.vertices[index + 1])
    }

    pub fn length(&self) -> f64 {
        let mut total = 0f64;
        for i in 0..self.num_segments() {
            total += self.vertices[i].distance(&self.vertices[i + 1]);
        }
        total
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::default();
        for i in 0..self.num_segments() {
            bb.expand_to(self.segment(i).get_bounding_box());
        }
        bb
    }
}

/// A storage container for multiple related polylines, e.g. the road network.
/// Carries the CRS identifier shared by every vertex it holds, so the pipeline can
/// assert it matches the TerrainGrid it is evaluated against.
#[derive(Clone, Debug, Default)]
pub struct MultiPolyline {
    parts: Vec<Polyline>,
    crs: String,
}

impl Index<usize> for MultiPolyline {
    type Output = Polyline;

    fn index<'a>(&'a self, index: usize) -> &'a Polyline {
        &self.parts[index]
    }
}

impl MultiPolyline {
    pub fn new(crs: impl Into<String>) -> MultiPolyline {
        MultiPolyline { parts: vec![], crs: crs.into() }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn push(&mut self, polyline: Polyline) {
        self.parts.push(polyline);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polyline> {
        self.parts.iter()
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }
}
