use super::{CellIdx, TriangleMesh, VertexIdx};

use indexmap::IndexMap;
use itertools::Itertools;

/// An edge given through its two vertices in ascending order.
pub type Facet = [VertexIdx; 2];

impl TriangleMesh {
  /// All edges of the mesh together with the cells containing them,
  /// in order of first appearance.
  pub fn facets(&self) -> IndexMap<Facet, Vec<CellIdx>> {
    let mut facets: IndexMap<Facet, Vec<CellIdx>> = IndexMap::new();
    for (icell, cell) in self.cells().iter().enumerate() {
      for (i, j) in [(0, 1), (0, 2), (1, 2)] {
        let (a, b) = (cell[i], cell[j]);
        let facet = if a < b { [a, b] } else { [b, a] };
        facets.entry(facet).or_default().push(icell);
      }
    }
    facets
  }

  /// The boundary facets are characterized by the fact that they
  /// only have 1 cell as super entity.
  pub fn boundary_facets(&self) -> Vec<Facet> {
    self
      .facets()
      .into_iter()
      .filter(|(_, cells)| cells.len() == 1)
      .map(|(facet, _)| facet)
      .collect()
  }

  /// The vertices that lie on the boundary of the mesh, in ascending order.
  pub fn boundary_vertices(&self) -> Vec<VertexIdx> {
    self
      .boundary_facets()
      .into_iter()
      .flatten()
      .sorted_unstable()
      .dedup()
      .collect()
  }
}
