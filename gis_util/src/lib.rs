/*
This file is part of the GIS Address Server
Copyright (C) 2023 Novel-T

The GIS Address Server is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

pub mod config;
pub mod consolidate;
pub mod factory;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod model;
pub mod paths;
pub mod query;
pub mod rtree;
pub mod store;
pub mod util;
