//! Executive del pipeline.
//!
//! Grafo explícito y acíclico de nodos (algoritmo + información por puerto +
//! dato cacheado) sobre una arena indexada por `NodeId`. El executive es el
//! único dueño de los stores; los algoritmos los ven a través de
//! `RequestContext` durante una pasada.
//!
//! `update` corre las pasadas en orden fijo y cachea por sellos: un nodo
//! re-ejecuta sólo si su dato falta, está viejo respecto del reloj lógico, o
//! algún sello estampado difiere de lo negociado. La travesía es recursiva,
//! single-threaded y cooperativa; un set `visiting` corta ciclos con error
//! duro.

use std::collections::HashSet;

use grid_meta::MetadataStore;
use uuid::Uuid;

use crate::algorithm::{Algorithm, InputSlot, OutputSlot, RequestContext};
use crate::data::{DataObject, ExtentMode};
use crate::demand;
use crate::errors::PipelineError;
use crate::extent::Extent;
use crate::keys;
use crate::mtime::next_mtime;
use crate::request::{Request, RequestKind};
use crate::splitter::{self, SplitPolicy};

pub type NodeId = usize;

/// Puerto de salida de un nodo, extremo productor de una conexión.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputPort {
    pub node: NodeId,
    pub port: usize,
}

struct NodeSlot {
    uuid: Uuid,
    algorithm: Box<dyn Algorithm>,
    /// `connections[puerto_de_entrada]` = productores conectados.
    connections: Vec<Vec<OutputPort>>,
    in_info: Vec<Vec<MetadataStore>>,
    out_info: Vec<MetadataStore>,
    data: Vec<Option<DataObject>>,
    data_time: Vec<u64>,
    information_time: u64,
    continue_executing: bool,
}

impl NodeSlot {
    fn new(algorithm: Box<dyn Algorithm>) -> NodeSlot {
        let nin = algorithm.num_input_ports();
        let nout = algorithm.num_output_ports();
        NodeSlot { uuid: Uuid::new_v4(),
                   algorithm,
                   connections: vec![Vec::new(); nin],
                   in_info: vec![Vec::new(); nin],
                   out_info: (0..nout).map(|_| MetadataStore::new()).collect(),
                   data: (0..nout).map(|_| None).collect(),
                   data_time: vec![0; nout],
                   information_time: 0,
                   continue_executing: false }
    }
}

struct NodeSnapshot {
    in_info: Vec<Vec<MetadataStore>>,
    out_info: Vec<MetadataStore>,
    data: Vec<Option<DataObject>>,
    data_time: Vec<u64>,
    information_time: u64,
    continue_executing: bool,
}

pub struct Pipeline {
    nodes: Vec<NodeSlot>,
    topology_time: u64,
    visiting: HashSet<NodeId>,
}

impl Pipeline {
    pub fn new() -> Pipeline {
        Pipeline { nodes: Vec::new(),
                   topology_time: next_mtime(),
                   visiting: HashSet::new() }
    }

    pub fn add_node(&mut self, algorithm: Box<dyn Algorithm>) -> NodeId {
        self.nodes.push(NodeSlot::new(algorithm));
        self.topology_time = next_mtime();
        self.nodes.len() - 1
    }

    /// Conecta `producer` al puerto de entrada `input_port` de `consumer`.
    pub fn connect(&mut self,
                   producer: OutputPort,
                   consumer: NodeId,
                   input_port: usize)
                   -> Result<(), PipelineError> {
        self.check_port(producer.node, producer.port)?;
        self.check_node(consumer)?;
        let nin = self.nodes[consumer].connections.len();
        if input_port >= nin {
            return Err(PipelineError::InvalidPort { node: consumer, port: input_port, limit: nin });
        }
        self.nodes[consumer].connections[input_port].push(producer);
        self.nodes[consumer].in_info[input_port].push(MetadataStore::new());
        self.topology_time = next_mtime();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_uuid(&self, node: NodeId) -> Option<Uuid> {
        self.nodes.get(node).map(|n| n.uuid)
    }

    pub fn algorithm(&self, node: NodeId) -> Option<&dyn Algorithm> {
        self.nodes.get(node).map(|n| n.algorithm.as_ref())
    }

    pub fn algorithm_mut(&mut self, node: NodeId) -> Option<&mut (dyn Algorithm + 'static)> {
        self.nodes.get_mut(node).map(|n| n.algorithm.as_mut())
    }

    pub fn output_information(&self, node: NodeId, port: usize) -> Option<&MetadataStore> {
        self.nodes.get(node).and_then(|n| n.out_info.get(port))
    }

    pub fn output_information_mut(&mut self,
                                  node: NodeId,
                                  port: usize)
                                  -> Option<&mut MetadataStore> {
        self.nodes.get_mut(node).and_then(|n| n.out_info.get_mut(port))
    }

    pub fn output_data(&self, node: NodeId, port: usize) -> Option<&DataObject> {
        self.nodes.get(node).and_then(|n| n.data.get(port)).and_then(|d| d.as_ref())
    }

    // -- setters de demanda (dirty-bit) -------------------------------------

    /// Pide un sub-extent; devuelve si la demanda cambió.
    pub fn set_update_extent(&mut self,
                             node: NodeId,
                             port: usize,
                             ext: &Extent)
                             -> Result<bool, PipelineError> {
        self.check_port(node, port)?;
        Ok(keys::set_update_extent(&mut self.nodes[node].out_info[port], ext))
    }

    /// Pide una tupla (pieza, piezas, fantasmas); devuelve si cambió.
    pub fn set_update_piece(&mut self,
                            node: NodeId,
                            port: usize,
                            piece: i64,
                            num_pieces: i64,
                            ghost_levels: i64)
                            -> Result<bool, PipelineError> {
        self.check_port(node, port)?;
        let info = &mut self.nodes[node].out_info[port];
        let mut changed = keys::update_piece_number().set(info, piece);
        changed |= keys::update_number_of_pieces().set(info, num_pieces);
        changed |= keys::update_number_of_ghost_levels().set(info, ghost_levels);
        Ok(changed)
    }

    pub fn set_update_time_step(&mut self,
                                node: NodeId,
                                port: usize,
                                time: f64)
                                -> Result<bool, PipelineError> {
        self.check_port(node, port)?;
        Ok(keys::update_time_step().set(&mut self.nodes[node].out_info[port], time))
    }

    /// La próxima propagación reemplaza el extent combinado en vez de unirlo.
    pub fn set_update_extent_replace(&mut self,
                                     node: NodeId,
                                     port: usize,
                                     replace: bool)
                                     -> Result<bool, PipelineError> {
        self.check_port(node, port)?;
        Ok(keys::set_flag(keys::update_extent_replace(),
                          &mut self.nodes[node].out_info[port],
                          replace))
    }

    pub fn set_exact_extent(&mut self,
                            node: NodeId,
                            port: usize,
                            exact: bool)
                            -> Result<bool, PipelineError> {
        self.check_port(node, port)?;
        Ok(keys::set_flag(keys::exact_extent(), &mut self.nodes[node].out_info[port], exact))
    }

    // -- actualización ------------------------------------------------------

    /// Actualiza el puerto 0 del nodo.
    pub fn update(&mut self, node: NodeId) -> Result<(), PipelineError> {
        self.update_port(node, 0)
    }

    /// Corre las pasadas en orden y repite la fase de datos mientras el
    /// algoritmo pida seguir ejecutando.
    pub fn update_port(&mut self, node: NodeId, port: usize) -> Result<(), PipelineError> {
        self.check_port(node, port)?;
        self.update_information(node)?;
        loop {
            self.propagate_update_time(node, port)?;
            self.update_time_dependent_information(node)?;
            self.propagate_update_extent(node, port)?;
            self.update_data(node, port)?;
            if !self.nodes[node].continue_executing {
                break;
            }
        }
        Ok(())
    }

    /// Pasada de información: metadatos producidos bajan de productor a
    /// consumidor. Se saltea si nada cambió desde la última corrida.
    pub fn update_information(&mut self, node: NodeId) -> Result<(), PipelineError> {
        self.check_node(node)?;
        self.enter(node)?;
        let result = self.update_information_inner(node);
        self.leave(node);
        result
    }

    fn update_information_inner(&mut self, node: NodeId) -> Result<(), PipelineError> {
        for up in self.upstream_ports(node) {
            self.update_information(up.node)?;
        }

        let pipeline_time = self.pipeline_mtime(node);
        if self.nodes[node].information_time >= pipeline_time {
            return Ok(());
        }
        log::debug!("nodo {node}: pasada de información");

        // pasada de objetos de dato: el algoritmo puede instalar uno propio,
        // el executive completa los que falten según la clase declarada
        let mut req = Request::new(RequestKind::DataObject, 0);
        if !self.call_algorithm(node, &mut req) {
            return Err(PipelineError::Internal(format!("nodo {node}: pasada de objetos de dato rechazada")));
        }
        for port in 0..self.nodes[node].out_info.len() {
            if self.nodes[node].data[port].is_none() {
                let kind = self.nodes[node].algorithm.output_data_kind(port);
                self.nodes[node].data[port] = Some(DataObject::new(kind));
            }
        }

        self.refresh_inputs(node);
        self.copy_information_downstream(node);

        let mut req = Request::new(RequestKind::Information, 0);
        if !self.call_algorithm(node, &mut req) {
            return Err(PipelineError::Internal(format!("nodo {node}: pasada de información rechazada")));
        }

        // defaults posteriores: demanda inicial = todo el dato
        for port in 0..self.nodes[node].out_info.len() {
            let info = &mut self.nodes[node].out_info[port];
            if !keys::update_extent().has(info) {
                keys::set_update_extent_to_whole_extent(info);
            }
            if keys::get_flag(keys::can_handle_piece_request(), info)
               && !keys::maximum_number_of_pieces().has(info)
            {
                // -1 = sin límite declarado
                keys::maximum_number_of_pieces().set(info, -1);
            }
        }

        self.nodes[node].information_time = next_mtime();
        Ok(())
    }

    /// Pasada de tiempo: la demanda temporal sube de consumidor a productor.
    fn propagate_update_time(&mut self, node: NodeId, port: usize) -> Result<(), PipelineError> {
        if !keys::update_time_step().has(&self.nodes[node].out_info[port]) {
            return Ok(());
        }
        self.enter(node)?;
        let result = self.propagate_update_time_inner(node, port);
        self.leave(node);
        result
    }

    fn propagate_update_time_inner(&mut self, node: NodeId, port: usize) -> Result<(), PipelineError> {
        self.refresh_inputs(node);
        // default: el mismo tiempo pedido sube por todas las entradas
        let time = keys::update_time_step().get(&self.nodes[node].out_info[port]);
        for p in 0..self.nodes[node].in_info.len() {
            for c in 0..self.nodes[node].in_info[p].len() {
                keys::update_time_step().set(&mut self.nodes[node].in_info[p][c], time);
            }
        }

        let mut req = Request::new(RequestKind::UpdateTime, port);
        if !self.call_algorithm(node, &mut req) {
            return Err(PipelineError::Internal(format!("nodo {node}: pasada de tiempo rechazada")));
        }

        for (p, conns) in self.nodes[node].connections.clone().into_iter().enumerate() {
            for (c, up) in conns.into_iter().enumerate() {
                let requested = &self.nodes[node].in_info[p][c];
                if !keys::update_time_step().has(requested) {
                    continue;
                }
                let time = keys::update_time_step().get(requested);
                keys::update_time_step().set(&mut self.nodes[up.node].out_info[up.port], time);
                self.propagate_update_time(up.node, up.port)?;
            }
        }
        Ok(())
    }

    /// Re-corre la pasada de información en los nodos cuyos metadatos
    /// dependen del tiempo pedido.
    fn update_time_dependent_information(&mut self, node: NodeId) -> Result<(), PipelineError> {
        self.enter(node)?;
        let result = self.update_time_dependent_information_inner(node);
        self.leave(node);
        result
    }

    fn update_time_dependent_information_inner(&mut self, node: NodeId) -> Result<(), PipelineError> {
        for up in self.upstream_ports(node) {
            self.update_time_dependent_information(up.node)?;
        }
        let dependent = self.nodes[node]
                            .out_info
                            .iter()
                            .any(|info| keys::get_flag(keys::time_dependent_information(), info));
        if !dependent {
            return Ok(());
        }
        log::debug!("nodo {node}: información dependiente del tiempo");

        self.refresh_inputs(node);
        let mut req = Request::new(RequestKind::TimeDependentInformation, 0);
        if !self.call_algorithm(node, &mut req) {
            return Err(PipelineError::Internal(format!("nodo {node}: información temporal rechazada")));
        }
        Ok(())
    }

    /// Pasada de extents: la demanda sube, combinándose en cada productor.
    pub fn propagate_update_extent(&mut self, node: NodeId, port: usize) -> Result<(), PipelineError> {
        self.check_port(node, port)?;
        self.enter(node)?;
        let result = self.propagate_update_extent_inner(node, port);
        self.leave(node);
        result
    }

    fn propagate_update_extent_inner(&mut self,
                                     node: NodeId,
                                     port: usize)
                                     -> Result<(), PipelineError> {
        if let Err(err) = self.verify_output_information(node) {
            log::error!("nodo {node}: información de salida inválida: {err}");
            return Err(err);
        }

        self.combine_update_extent(node, port);

        if !self.need_to_execute_data(node, port)? {
            // nada que pedir aguas arriba; la próxima ronda combina de cero
            keys::combined_update_extent().remove(&mut self.nodes[node].out_info[port]);
            log::debug!("nodo {node} puerto {port}: demanda ya satisfecha, corto circuito");
            return Ok(());
        }

        self.refresh_inputs(node);
        self.copy_demand_defaults_upstream(node, port);

        let mut req = Request::new(RequestKind::UpdateExtent, port);
        if !self.call_algorithm(node, &mut req) {
            return Err(PipelineError::Internal(format!("nodo {node}: pasada de extents rechazada")));
        }

        for (p, conns) in self.nodes[node].connections.clone().into_iter().enumerate() {
            for (c, up) in conns.into_iter().enumerate() {
                self.push_demand_upstream(node, p, c, up);
                self.propagate_update_extent(up.node, up.port)?;
            }
        }
        Ok(())
    }

    /// Une el extent pedido al combinado (o lo reemplaza si el consumidor
    /// activó el flag) y deja el resultado como demanda efectiva.
    fn combine_update_extent(&mut self, node: NodeId, port: usize) {
        let mode = self.extent_mode(node, port);
        let info = &mut self.nodes[node].out_info[port];
        if mode != ExtentMode::ThreeD {
            return;
        }
        let requested = keys::get_update_extent(info);
        let combined = if keys::get_flag(keys::update_extent_replace(), info) {
            requested
        } else {
            keys::get_extent(keys::combined_update_extent(), info).union(&requested)
        };
        keys::set_extent(keys::combined_update_extent(), info, &combined);
        keys::update_extent_replace().remove(info);
        keys::set_update_extent(info, &combined);
    }

    /// Defaults de demanda hacia arriba: lo pedido en `port` baja igual a
    /// cada entrada; el algoritmo los ajusta después.
    fn copy_demand_defaults_upstream(&mut self, node: NodeId, port: usize) {
        let source = self.nodes[node].out_info[port].clone();
        let demand_list = demand::demand_keys_of(&source);
        for p in 0..self.nodes[node].in_info.len() {
            for c in 0..self.nodes[node].in_info[p].len() {
                let dest = &mut self.nodes[node].in_info[p][c];
                dest.copy_entry(&source, keys::update_time_step().key(), false);
                dest.copy_entry(&source, keys::update_piece_number().key(), false);
                dest.copy_entry(&source, keys::update_number_of_pieces().key(), false);
                dest.copy_entry(&source, keys::update_number_of_ghost_levels().key(), false);
                dest.copy_entry(&source, keys::update_resolution().key(), false);
                for &key in &demand_list {
                    demand::copy_demand(key, &source, dest);
                }
                // el extent default es lo pedido, recortado al whole de la entrada
                let requested = keys::get_update_extent(&source);
                let whole = keys::get_whole_extent(dest);
                let default = if requested.is_empty() || whole.is_empty() {
                    whole
                } else {
                    requested.intersect(&whole)
                };
                keys::set_update_extent(dest, &default);
                keys::exact_extent().remove(dest);
            }
        }
    }

    /// Publica la demanda ajustada de una conexión en la información de
    /// salida del productor.
    fn push_demand_upstream(&mut self, node: NodeId, p: usize, c: usize, up: OutputPort) {
        let requested = self.nodes[node].in_info[p][c].clone();
        let demand_list = demand::demand_keys_of(&self.nodes[up.node].out_info[up.port]);
        let dest = &mut self.nodes[up.node].out_info[up.port];
        dest.copy_entry(&requested, keys::update_extent().key(), false);
        dest.copy_entry(&requested, keys::update_piece_number().key(), false);
        dest.copy_entry(&requested, keys::update_number_of_pieces().key(), false);
        dest.copy_entry(&requested, keys::update_number_of_ghost_levels().key(), false);
        dest.copy_entry(&requested, keys::update_time_step().key(), false);
        dest.copy_entry(&requested, keys::update_resolution().key(), false);
        for key in demand_list {
            demand::copy_demand(key, &requested, dest);
        }
    }

    /// Pasada de datos: ejecuta aguas arriba primero y después el nodo, sólo
    /// si los sellos dicen que hace falta.
    pub fn update_data(&mut self, node: NodeId, port: usize) -> Result<(), PipelineError> {
        self.check_port(node, port)?;
        self.enter(node)?;
        let result = self.update_data_inner(node, port);
        self.leave(node);
        result
    }

    fn update_data_inner(&mut self, node: NodeId, port: usize) -> Result<(), PipelineError> {
        for up in self.upstream_ports(node) {
            self.update_data(up.node, up.port)?;
        }
        if !self.need_to_execute_data(node, port)? {
            log::debug!("nodo {node} puerto {port}: dato cacheado vigente");
            return Ok(());
        }
        log::debug!("nodo {node} puerto {port}: ejecutando");

        self.execute_data_start(node);
        self.refresh_inputs(node);

        let mut req = Request::new(RequestKind::Data, port);
        let ok = self.call_algorithm(node, &mut req);
        // una ejecución fallida no se sella: los sellos viejos quedan como
        // estaban y la próxima pasada vuelve a intentar
        if ok {
            self.mark_outputs_generated(node);
        }
        self.execute_data_end(node, &req, ok);
        if !ok {
            return Err(PipelineError::Internal(format!("nodo {node}: la ejecución falló")));
        }
        Ok(())
    }

    /// Prepara la ejecución: guarda el extent multi-pieza y, si el algoritmo
    /// produce sub-extents, recorta la demanda a la pieza pedida.
    fn execute_data_start(&mut self, node: NodeId) {
        for port in 0..self.nodes[node].out_info.len() {
            let mode = self.extent_mode(node, port);
            if let Some(data) = &mut self.nodes[node].data[port] {
                // el sello de este round lo pone el algoritmo o el executive
                keys::data_extent().remove(&mut data.information);
            }
            if mode != ExtentMode::ThreeD {
                continue;
            }
            let info = &mut self.nodes[node].out_info[port];
            let requested = keys::get_update_extent(info);
            keys::set_extent(keys::all_pieces_extent(), info, &requested);

            let num_pieces = keys::get_update_number_of_pieces(info);
            if num_pieces > 1 && keys::get_flag(keys::can_produce_sub_extent(), info) {
                let whole = keys::get_whole_extent(info);
                let piece = keys::get_update_piece(info);
                let ghost = keys::get_update_ghost_levels(info) as i32;
                let policy = SplitPolicy::from_code(keys::split_policy().get(info));
                let sub = splitter::split(&whole, piece, num_pieces, ghost, policy, false);
                keys::set_update_extent(info, &sub);
            }
        }
    }

    /// Estampa los sellos de ejecución en la información del dato producido.
    fn mark_outputs_generated(&mut self, node: NodeId) {
        let slot = &mut self.nodes[node];
        for port in 0..slot.out_info.len() {
            let Some(data) = slot.data[port].as_mut() else {
                continue;
            };
            let info = &slot.out_info[port];
            let dinfo = &mut data.information;

            keys::data_piece_number().set(dinfo, keys::get_update_piece(info));
            keys::data_number_of_pieces().set(dinfo, keys::get_update_number_of_pieces(info));
            let requested_ghosts = keys::get_update_ghost_levels(info);
            let produced_ghosts = if keys::data_number_of_ghost_levels().has(dinfo) {
                keys::data_number_of_ghost_levels().get(dinfo).max(requested_ghosts)
            } else {
                requested_ghosts
            };
            keys::data_number_of_ghost_levels().set(dinfo, produced_ghosts);

            if keys::update_time_step().has(info) {
                let requested = keys::update_time_step().get(info);
                keys::previous_update_time_step().set(dinfo, requested);
                if !keys::data_time_step().has(dinfo) {
                    keys::data_time_step().set(dinfo, requested);
                }
            }

            if data.kind.extent_mode() == ExtentMode::ThreeD
               && !keys::data_extent().has(dinfo)
            {
                let produced = keys::get_update_extent(info);
                keys::set_extent(keys::data_extent(), dinfo, &produced);
            }

            for key in demand::demand_keys_of(info) {
                demand::store_meta_data(key, info, dinfo);
            }
        }
    }

    /// Cierra la ejecución: restaura extents y limpia el combinado siempre;
    /// el recorte exacto, el sello de reloj y el pedido de continuación sólo
    /// se toman de una ejecución que anduvo.
    fn execute_data_end(&mut self, node: NodeId, request: &Request, ok: bool) {
        let continue_executing = request.continue_executing();
        let slot = &mut self.nodes[node];
        for port in 0..slot.out_info.len() {
            let info = &mut slot.out_info[port];
            if keys::all_pieces_extent().has(info) {
                let full = keys::get_extent(keys::all_pieces_extent(), info);
                keys::set_update_extent(info, &full);
                keys::all_pieces_extent().remove(info);
            }
            keys::combined_update_extent().remove(info);
            if !ok {
                continue;
            }

            let exact = keys::get_flag(keys::exact_extent(), info);
            let requested = keys::get_update_extent(info);
            if let Some(data) = slot.data[port].as_mut() {
                if exact && data.kind.extent_mode() == ExtentMode::ThreeD {
                    data.crop(&requested);
                }
            }
            slot.data_time[port] = next_mtime();
        }
        if ok {
            slot.continue_executing = continue_executing;
            if continue_executing {
                log::debug!("nodo {node}: pide continuar la ejecución");
            }
        }
    }

    // -- decisión de re-ejecución -------------------------------------------

    /// `true` si el dato cacheado del puerto no satisface la demanda actual.
    pub fn need_to_execute_data(&self, node: NodeId, port: usize) -> Result<bool, PipelineError> {
        self.check_port(node, port)?;
        let slot = &self.nodes[node];
        if slot.continue_executing {
            return Ok(true);
        }
        let Some(data) = slot.data[port].as_ref() else {
            return Ok(true);
        };
        if slot.data_time[port] < self.pipeline_mtime(node) {
            return Ok(true);
        }

        let info = &slot.out_info[port];
        let dinfo = &data.information;

        let update_pieces = keys::get_update_number_of_pieces(info);
        let update_piece = keys::get_update_piece(info);
        let update_ghosts = keys::get_update_ghost_levels(info);
        let data_pieces = keys::data_number_of_pieces().get(dinfo);
        let data_piece = keys::data_piece_number().get(dinfo);
        let data_ghosts = keys::data_number_of_ghost_levels().get(dinfo);

        if data_pieces != update_pieces {
            return Ok(true);
        }
        if update_pieces > 1 && data_ghosts < update_ghosts {
            return Ok(true);
        }
        if data_pieces != 1 && data_piece != update_piece {
            return Ok(true);
        }

        if data.kind.extent_mode() == ExtentMode::ThreeD {
            let requested = Self::effective_request_extent(info);
            let produced = keys::get_extent(keys::data_extent(), dinfo);
            if !requested.is_empty() && !produced.contains(&requested) {
                return Ok(true);
            }
        }

        if self.need_to_execute_based_on_time(info, dinfo) {
            return Ok(true);
        }

        Ok(demand::demand_keys_of(info).into_iter()
                                       .any(|key| demand::needs_execute(key, info, dinfo)))
    }

    /// Extent que la demanda actual va a producir de verdad: si el pedido es
    /// por piezas y el algoritmo produce sub-extents, la pieza recortada.
    fn effective_request_extent(info: &MetadataStore) -> Extent {
        let requested = keys::get_update_extent(info);
        let num_pieces = keys::get_update_number_of_pieces(info);
        if num_pieces > 1 && keys::get_flag(keys::can_produce_sub_extent(), info) {
            let whole = keys::get_whole_extent(info);
            let piece = keys::get_update_piece(info);
            let ghost = keys::get_update_ghost_levels(info) as i32;
            let policy = SplitPolicy::from_code(keys::split_policy().get(info));
            return splitter::split(&whole, piece, num_pieces, ghost, policy, false);
        }
        requested
    }

    /// Decisión temporal con guarda de oscilación: si el último pedido fue
    /// exactamente este tiempo, el dato vale aunque el productor lo haya
    /// ajustado a otra muestra.
    fn need_to_execute_based_on_time(&self, info: &MetadataStore, dinfo: &MetadataStore) -> bool {
        if !keys::update_time_step().has(info) {
            return false;
        }
        // un productor sin eje temporal ignora el tiempo pedido
        if !keys::time_steps().has(info) && !keys::time_range().has(info) {
            return false;
        }
        let requested = keys::update_time_step().get(info);
        if keys::previous_update_time_step().has(dinfo)
           && keys::previous_update_time_step().get(dinfo) == requested
        {
            return false;
        }
        if !keys::data_time_step().has(dinfo) {
            return true;
        }
        keys::data_time_step().get(dinfo) != requested
    }

    // -- verificación -------------------------------------------------------

    /// Chequeos duros antes de propagar extents; cualquier falla aborta la
    /// actualización.
    pub fn verify_output_information(&self, node: NodeId) -> Result<(), PipelineError> {
        self.check_node(node)?;
        let slot = &self.nodes[node];
        for port in 0..slot.out_info.len() {
            if slot.data[port].is_none() {
                return Err(PipelineError::MissingDataObject { node, port });
            }
            let info = &slot.out_info[port];
            match self.extent_mode(node, port) {
                ExtentMode::Pieces => {
                    for key in [keys::update_piece_number(),
                                keys::update_number_of_pieces(),
                                keys::maximum_number_of_pieces()]
                    {
                        if !key.has(info) {
                            return Err(PipelineError::MissingKey { node,
                                                                   port,
                                                                   key: key.key().name() });
                        }
                    }
                    let piece = keys::get_update_piece(info);
                    let pieces = keys::get_update_number_of_pieces(info);
                    if piece < 0 || piece >= pieces {
                        return Err(PipelineError::PieceOutOfRange { node, port, piece, pieces });
                    }
                }
                ExtentMode::ThreeD => {
                    if !keys::whole_extent().has(info) {
                        return Err(PipelineError::MissingKey { node,
                                                               port,
                                                               key: keys::whole_extent().key()
                                                                                        .name() });
                    }
                    if !keys::update_extent().has(info) {
                        return Err(PipelineError::MissingKey { node,
                                                               port,
                                                               key: keys::update_extent().key()
                                                                                         .name() });
                    }
                    let whole = keys::get_whole_extent(info);
                    let requested = keys::get_update_extent(info);
                    let unrestricted = keys::get_flag(keys::unrestricted_update_extent(), info)
                                       || keys::update_resolution().has(info);
                    if !unrestricted && !whole.contains(&requested) {
                        return Err(PipelineError::ExtentOutsideWhole { node,
                                                                       port,
                                                                       requested,
                                                                       whole });
                    }
                }
            }
        }
        Ok(())
    }

    // -- prioridad ----------------------------------------------------------

    /// Sondeo de costo relativo de la demanda actual, sin efectos visibles:
    /// corre información y propagación de extents sobre una copia del estado
    /// y devuelve la fracción del dato completo que la demanda cubre
    /// (0.0 = nada, 1.0 = todo).
    pub fn compute_priority(&mut self, node: NodeId, port: usize) -> Result<f64, PipelineError> {
        self.check_port(node, port)?;
        let saved: Vec<NodeSnapshot> = self.nodes.iter().map(Self::snapshot).collect();
        let result = self.compute_priority_inner(node, port);
        for (slot, snap) in self.nodes.iter_mut().zip(saved) {
            Self::restore(slot, snap);
        }
        result
    }

    fn compute_priority_inner(&mut self, node: NodeId, port: usize) -> Result<f64, PipelineError> {
        self.update_information(node)?;
        self.propagate_update_extent(node, port)?;

        let info = &self.nodes[node].out_info[port];
        match self.extent_mode(node, port) {
            ExtentMode::ThreeD => {
                let whole = keys::get_whole_extent(info);
                let requested = Self::effective_request_extent(info).intersect(&whole);
                if whole.is_empty() {
                    return Ok(1.0);
                }
                if requested.is_empty() {
                    return Ok(0.0);
                }
                Ok(requested.num_points() as f64 / whole.num_points() as f64)
            }
            ExtentMode::Pieces => {
                let pieces = keys::get_update_number_of_pieces(info).max(1);
                let piece = keys::get_update_piece(info);
                if piece < 0 || piece >= pieces {
                    return Ok(0.0);
                }
                Ok(1.0 / pieces as f64)
            }
        }
    }

    fn snapshot(slot: &NodeSlot) -> NodeSnapshot {
        NodeSnapshot { in_info: slot.in_info.clone(),
                       out_info: slot.out_info.clone(),
                       data: slot.data.clone(),
                       data_time: slot.data_time.clone(),
                       information_time: slot.information_time,
                       continue_executing: slot.continue_executing }
    }

    fn restore(slot: &mut NodeSlot, snap: NodeSnapshot) {
        slot.in_info = snap.in_info;
        slot.out_info = snap.out_info;
        slot.data = snap.data;
        slot.data_time = snap.data_time;
        slot.information_time = snap.information_time;
        slot.continue_executing = snap.continue_executing;
    }

    // -- plomería -----------------------------------------------------------

    /// Reloj lógico del sub-pipeline que alimenta al nodo: topología, el
    /// algoritmo propio y todo lo de aguas arriba.
    pub fn pipeline_mtime(&self, node: NodeId) -> u64 {
        let mut seen = HashSet::new();
        self.pipeline_mtime_walk(node, &mut seen)
    }

    fn pipeline_mtime_walk(&self, node: NodeId, seen: &mut HashSet<NodeId>) -> u64 {
        if !seen.insert(node) {
            return 0;
        }
        let mut time = self.topology_time.max(self.nodes[node].algorithm.modified_time());
        for up in self.upstream_ports(node) {
            time = time.max(self.pipeline_mtime_walk(up.node, seen));
        }
        time
    }

    fn upstream_ports(&self, node: NodeId) -> Vec<OutputPort> {
        self.nodes[node].connections.iter().flatten().copied().collect()
    }

    /// Refresca las vistas de entrada con la información de salida actual de
    /// cada productor conectado.
    fn refresh_inputs(&mut self, node: NodeId) {
        for (p, conns) in self.nodes[node].connections.clone().into_iter().enumerate() {
            for (c, up) in conns.into_iter().enumerate() {
                let upstream = self.nodes[up.node].out_info[up.port].clone();
                self.nodes[node].in_info[p][c].copy(&upstream, false);
            }
        }
    }

    /// Baja los metadatos estándar de la primera entrada a todas las salidas,
    /// más las keys listadas bajo KEYS_TO_COPY.
    fn copy_information_downstream(&mut self, node: NodeId) {
        let Some(source) = self.nodes[node]
                               .in_info
                               .first()
                               .and_then(|conns| conns.first())
                               .cloned()
        else {
            return;
        };
        let extra = keys::keys_to_copy().get(&source);
        for info in &mut self.nodes[node].out_info {
            info.copy_entry(&source, keys::whole_extent().key(), false);
            info.copy_entry(&source, keys::maximum_number_of_pieces().key(), false);
            info.copy_entry(&source, keys::time_steps().key(), false);
            info.copy_entry(&source, keys::time_range().key(), false);
            info.copy_entry(&source, keys::time_dependent_information().key(), false);
            info.copy_entry(&source, keys::keys_to_copy().key(), false);
            for &key in &extra {
                info.copy_entry(&source, key, false);
            }
        }
    }

    fn extent_mode(&self, node: NodeId, port: usize) -> ExtentMode {
        match &self.nodes[node].data[port] {
            Some(data) => data.kind.extent_mode(),
            None => self.nodes[node].algorithm.output_data_kind(port).extent_mode(),
        }
    }

    /// Construye las vistas de puertos y entrega el request al algoritmo.
    fn call_algorithm(&mut self, node: NodeId, request: &mut Request) -> bool {
        let mut input_data: Vec<Vec<Option<DataObject>>> = Vec::new();
        for conns in self.nodes[node].connections.clone() {
            let mut port_data = Vec::new();
            for up in conns {
                port_data.push(self.nodes[up.node].data[up.port].clone());
            }
            input_data.push(port_data);
        }

        let NodeSlot { algorithm, in_info, out_info, data, .. } = &mut self.nodes[node];

        let mut inputs: Vec<Vec<InputSlot<'_>>> =
            in_info.iter_mut()
                   .zip(input_data)
                   .map(|(infos, datas)| {
                       infos.iter_mut()
                            .zip(datas)
                            .map(|(info, data)| InputSlot { info, data })
                            .collect()
                   })
                   .collect();
        let mut outputs: Vec<OutputSlot<'_>> =
            out_info.iter_mut()
                    .zip(data.iter_mut())
                    .map(|(info, data)| OutputSlot { info, data })
                    .collect();

        let mut ctx = RequestContext { inputs: &mut inputs, outputs: &mut outputs };
        algorithm.process_request(request, &mut ctx)
    }

    fn enter(&mut self, node: NodeId) -> Result<(), PipelineError> {
        if !self.visiting.insert(node) {
            return Err(PipelineError::CycleDetected(node));
        }
        Ok(())
    }

    fn leave(&mut self, node: NodeId) {
        self.visiting.remove(&node);
    }

    fn check_node(&self, node: NodeId) -> Result<(), PipelineError> {
        if node < self.nodes.len() {
            Ok(())
        } else {
            Err(PipelineError::UnknownNode(node))
        }
    }

    fn check_port(&self, node: NodeId, port: usize) -> Result<(), PipelineError> {
        self.check_node(node)?;
        let limit = self.nodes[node].out_info.len();
        if port < limit {
            Ok(())
        } else {
            Err(PipelineError::InvalidPort { node, port, limit })
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::new()
    }
}
