use crate::error::{LaminaError, Result};
use crate::layers::layer::Layer;
use crate::math::grid::Grid;

/// The per-call context a backward pass needs: each layer's forward input,
/// recorded in layer order by [`Network::forward_with_trace`].
///
/// A trace is consumed by [`Network::backward`] by move, so it can be used
/// exactly once and never replayed against parameters that have since been
/// updated. Interleaved forward passes each carry their own trace.
pub struct ForwardTrace {
    layer_inputs: Vec<Vec<Grid>>,
}

impl ForwardTrace {
    pub fn len(&self) -> usize {
        self.layer_inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layer_inputs.is_empty()
    }
}

/// An ordered, exclusively-owned sequence of layers forming one
/// differentiable pipeline.
#[derive(Default)]
pub struct Network {
    layers: Vec<Box<dyn Layer>>,
}

impl Network {
    pub fn new() -> Network {
        Network { layers: Vec::new() }
    }

    /// Appends a layer to the end of the pipeline.
    pub fn add_layer<L: Layer + 'static>(&mut self, layer: L) {
        self.layers.push(Box::new(layer));
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Threads `input` through the layers in order. Inference path: nothing
    /// is recorded.
    pub fn forward(&self, input: &[Grid]) -> Result<Vec<Grid>> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.forward(&current)?;
        }
        Ok(current)
    }

    /// Like [`Network::forward`], additionally recording every layer's input
    /// into a [`ForwardTrace`] for a matching [`Network::backward`] call.
    pub fn forward_with_trace(&self, input: &[Grid]) -> Result<(Vec<Grid>, ForwardTrace)> {
        let mut trace = ForwardTrace {
            layer_inputs: Vec::with_capacity(self.layers.len()),
        };
        let mut current = input.to_vec();
        for layer in &self.layers {
            let output = layer.forward(&current)?;
            trace.layer_inputs.push(current);
            current = output;
        }
        Ok((current, trace))
    }

    /// Threads the loss gradient through the layers in reverse order, handing
    /// each layer the input recorded for it in `trace`. Every layer applies
    /// its own parameter update as a side effect; the gradient with respect
    /// to the network input is discarded.
    pub fn backward(
        &mut self,
        trace: ForwardTrace,
        d_loss: &[Grid],
        learning_rate: f64,
        l2_lambda: f64,
    ) -> Result<()> {
        if trace.layer_inputs.len() != self.layers.len() {
            return Err(LaminaError::ShapeMismatch(format!(
                "backward: trace covers {} layers, network has {}",
                trace.layer_inputs.len(),
                self.layers.len()
            )));
        }
        let mut grad = d_loss.to_vec();
        for (layer, input) in self
            .layers
            .iter_mut()
            .rev()
            .zip(trace.layer_inputs.into_iter().rev())
        {
            grad = layer.backward(&input, &grad, learning_rate, l2_lambda)?;
        }
        Ok(())
    }
}
