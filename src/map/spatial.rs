use std::collections::HashMap;

/// Spatial hash grid over point positions for hover lookups.
/// Stores indices into the caller's point list.
pub struct SpatialGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    points: Vec<(f64, f64)>,
    /// Cell size in degrees
    cell_size: f64,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            points: Vec::new(),
            cell_size,
        }
    }

    /// Build from (lon, lat) points; item `i` is the `i`th point
    pub fn build(points: impl Iterator<Item = (f64, f64)>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (lon, lat) in points {
            grid.insert(lon, lat);
        }
        grid
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    pub fn insert(&mut self, lon: f64, lat: f64) {
        let idx = self.points.len();
        self.points.push((lon, lat));
        let cell = self.to_cell(lon, lat);
        self.cells.entry(cell).or_default().push(idx);
    }

    /// Candidate indices in cells overlapping a radius around a point
    pub fn query_radius(&self, lon: f64, lat: f64, radius_degrees: f64) -> Vec<usize> {
        let center_cell = self.to_cell(lon, lat);
        let cell_radius = (radius_degrees / self.cell_size).ceil() as i32;

        let mut results = Vec::new();
        for dy in -cell_radius..=cell_radius {
            for dx in -cell_radius..=cell_radius {
                let cell = (center_cell.0 + dx, center_cell.1 + dy);
                if let Some(indices) = self.cells.get(&cell) {
                    results.extend_from_slice(indices);
                }
            }
        }
        results
    }

    /// Closest point within `radius_degrees`. Ties go to the lower index.
    pub fn nearest(&self, lon: f64, lat: f64, radius_degrees: f64) -> Option<usize> {
        let max_d2 = radius_degrees * radius_degrees;
        self.query_radius(lon, lat, radius_degrees)
            .into_iter()
            .map(|idx| {
                let (plon, plat) = self.points[idx];
                let d2 = (plon - lon).powi(2) + (plat - lat).powi(2);
                (idx, d2)
            })
            .filter(|&(_, d2)| d2 <= max_d2)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(idx, _)| idx)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SpatialGrid {
        SpatialGrid::build(
            [(-60.0, -3.0), (-60.2, -3.1), (-48.5, -1.4), (-51.2, -30.0)].into_iter(),
            1.0,
        )
    }

    #[test]
    fn test_nearest_picks_closest() {
        let g = grid();
        assert_eq!(g.len(), 4);
        assert_eq!(g.nearest(-60.15, -3.05, 0.5), Some(1));
        assert_eq!(g.nearest(-48.4, -1.5, 0.5), Some(2));
    }

    #[test]
    fn test_nearest_respects_radius() {
        let g = grid();
        assert_eq!(g.nearest(-55.0, -15.0, 0.5), None);
        assert_eq!(g.nearest(-55.0, -15.0, 20.0), Some(1));
    }

    #[test]
    fn test_query_crosses_cell_boundaries() {
        let g = grid();
        let candidates = g.query_radius(-59.95, -2.95, 0.2);
        assert!(candidates.contains(&0));
        assert!(candidates.contains(&1));
    }

    #[test]
    fn test_empty_grid() {
        let g = SpatialGrid::new(1.0);
        assert!(g.is_empty());
        assert_eq!(g.nearest(0.0, 0.0, 10.0), None);
    }
}
